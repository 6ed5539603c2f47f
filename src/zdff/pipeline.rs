use log::{debug, warn};
use ndarray::ArrayView1;
use crate::zdff::baseline::{fit_baseline, BaselineFit, BaselineParams};
use crate::zdff::channel::{align_channels, Channel};
use crate::zdff::config::ZdffConfig;
use crate::zdff::error::{BaselineConvergenceWarning, ChannelRole, ZdffError};
use crate::zdff::regression::{fit_motion, RegressionResult, SlopeAssessment};
use crate::zdff::smooth::smooth;
use crate::zdff::standardize::{is_flat, is_negligible, magnitude, standardize};
/// Everything one `compute_zdff` call produced. Built once, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ZdffResult {
    pub trace: Channel,
    pub signal_baseline: BaselineFit,
    pub reference_baseline: BaselineFit,
    pub signal_standardized: Channel,
    pub reference_standardized: Channel,
    pub regression: RegressionResult,
    pub warnings: Vec<BaselineConvergenceWarning>,
}
impl ZdffResult {
    pub fn len(&self) -> usize {
        self.trace.len()
    }
    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }
    pub fn converged(&self) -> bool {
        self.warnings.is_empty()
    }
}
struct Detrended {
    fit: BaselineFit,
    standardized: Channel,
    warning: Option<BaselineConvergenceWarning>,
}
/// Computes the z-scored, motion-corrected dF/F of `signal` against the isosbestic `reference`.
///
/// Each channel is smoothed, baseline-corrected and standardized on its own; the standardized
/// reference is then regressed onto the standardized signal and the fit subtracted.
/// Channels of unequal length are truncated to the shorter one.
pub fn compute_zdff(
    signal: ArrayView1<'_, f64>,
    reference: ArrayView1<'_, f64>,
    config: &ZdffConfig,
) -> Result<ZdffResult, ZdffError> {
    config.validate()?;
    let pair = align_channels(signal, reference, config.min_samples())?;
    debug!(
        "aligned {} signal / {} reference samples to {}",
        signal.len(),
        reference.len(),
        pair.len()
    );
    let signal = detrend(pair.signal.view(), ChannelRole::Signal, config)?;
    let reference = detrend(pair.reference.view(), ChannelRole::Reference, config)?;
    let regression = fit_motion(
        signal.standardized.view(),
        reference.standardized.view(),
        config.regression,
    );
    match regression.assess_slope() {
        SlopeAssessment::Informative => {}
        assessment => warn!(
            "reference channel looks uninformative: slope {:.4} ({assessment:?})",
            regression.slope
        ),
    }
    let trace = &signal.standardized - &regression.predicted;
    let warnings = [signal.warning, reference.warning]
        .into_iter()
        .flatten()
        .collect();
    Ok(ZdffResult {
        trace,
        signal_baseline: signal.fit,
        reference_baseline: reference.fit,
        signal_standardized: signal.standardized,
        reference_standardized: reference.standardized,
        regression,
        warnings,
    })
}
fn detrend(
    raw: ArrayView1<'_, f64>,
    role: ChannelRole,
    config: &ZdffConfig,
) -> Result<Detrended, ZdffError> {
    if is_flat(raw) {
        return Err(ZdffError::DegenerateChannel { role });
    }
    let smoothed = smooth(raw, config.smoothing_window, config.smoothing_kernel)?;
    let params = BaselineParams {
        lambda: config.baseline_lambda,
        difference_order: config.baseline_difference_order,
        max_iter: config.baseline_max_iter,
        converge_tol: config.baseline_converge_tol,
    };
    let fit = fit_baseline(smoothed.view(), &params)?;
    let warning = if fit.diagnostics.converged {
        None
    } else {
        let warning = BaselineConvergenceWarning {
            role,
            iterations: fit.diagnostics.iterations,
            negative_residual_norm: fit.diagnostics.negative_residual_norm,
        };
        warn!("{warning}");
        Some(warning)
    };
    if is_negligible(fit.residual.view(), magnitude(raw)) {
        debug!("{role:?} baseline absorbed the whole channel");
        return Err(ZdffError::DegenerateChannel { role });
    }
    let standardized = standardize(fit.residual.view(), config.centering, role)?;
    Ok(Detrended {
        fit,
        standardized,
        warning,
    })
}
