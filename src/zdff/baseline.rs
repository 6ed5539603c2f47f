use log::debug;
use ndarray::{Array1, ArrayView1, Zip};
use crate::zdff::banded::SymmetricBanded;
use crate::zdff::channel::Channel;
use crate::zdff::error::ZdffError;
/// Tuning for [`fit_baseline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaselineParams {
    pub lambda: f64,
    pub difference_order: usize,
    pub max_iter: usize,
    pub converge_tol: f64,
}
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaselineDiagnostics {
    /// Penalized solves performed.
    pub iterations: usize,
    pub converged: bool,
    /// `|sum(r)|` over negative residuals of the returned iterate.
    pub negative_residual_norm: f64,
}
/// Smoothed channel split into slow baseline and fast residual.
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineFit {
    pub channel: Channel,
    pub baseline: Channel,
    pub residual: Channel,
    pub diagnostics: BaselineDiagnostics,
}
/// Fits a photobleaching baseline under `channel` with adaptive iteratively reweighted
/// penalized least squares (airPLS).
///
/// Samples above the current fit lose their weight, samples below it gain weight
/// exponentially in their distance, so the curve settles onto the lower envelope.
/// Running out of iterations is not an error: the last iterate is returned with
/// `diagnostics.converged == false`.
pub fn fit_baseline(
    channel: ArrayView1<'_, f64>,
    params: &BaselineParams,
) -> Result<BaselineFit, ZdffError> {
    let n = channel.len();
    if n <= params.difference_order {
        return Err(ZdffError::InvalidConfig(format!(
            "baseline fit needs more than {} samples, got {n}",
            params.difference_order
        )));
    }
    let penalty = SymmetricBanded::difference_penalty(n, params.difference_order, params.lambda);
    let abs_total: f64 = channel.iter().map(|v| v.abs()).sum();
    let threshold = params.converge_tol * abs_total;
    let mut weights = Array1::<f64>::ones(n);
    let mut iteration = 0;
    loop {
        iteration += 1;
        let rhs = &weights * &channel;
        let baseline = penalty
            .with_added_diagonal(weights.view())
            .solve(rhs.view())?;
        let residual = &channel - &baseline;
        let (negative_sum, negative_max) = residual
            .iter()
            .filter(|r| **r < 0.0)
            .fold((0.0, f64::NEG_INFINITY), |(sum, max), r| (sum + r, max.max(*r)));
        let dssn = negative_sum.abs();
        let converged = dssn <= threshold;
        if converged || iteration >= params.max_iter {
            debug!(
                "airPLS stopped after {iteration} iterations (dssn {dssn:.4e}, threshold {threshold:.4e}, converged {converged})"
            );
            return Ok(BaselineFit {
                channel: channel.to_owned(),
                baseline,
                residual,
                diagnostics: BaselineDiagnostics {
                    iterations: iteration,
                    converged,
                    negative_residual_norm: dssn,
                },
            });
        }
        let step = iteration as f64;
        Zip::from(&mut weights).and(&residual).for_each(|w, &r| {
            *w = if r < 0.0 { (step * r.abs() / dssn).exp() } else { 0.0 };
        });
        // Anchor both ends so the system stays positive definite.
        let edge = (step * negative_max / dssn).exp();
        weights[0] = edge;
        weights[n - 1] = edge;
    }
}
