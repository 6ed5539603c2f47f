use serde::{Deserialize, Serialize};
use crate::zdff::error::ZdffError;
/// Fewest samples the airPLS fit is allowed to run on.
pub const MIN_BASELINE_SAMPLES: usize = 16;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKernel {
    /// Moving average.
    #[default]
    Flat,
    Hanning,
    Hamming,
    Bartlett,
    Blackman,
    /// Tricube-weighted local linear regression, truncated at the edges.
    LocalLinear,
}
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionMethod {
    #[default]
    Ordinary,
    /// Huber-weighted iteratively reweighted least squares.
    Robust,
    /// Ordinary least squares with the slope clamped at zero from below.
    NonNegative,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centering {
    #[default]
    Mean,
    Median,
}
/// Tuning for one `compute_zdff` call. Missing fields in a config file fall back to [`Default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZdffConfig {
    /// Smoothing window in samples; must be odd.
    pub smoothing_window: usize,
    /// Penalty strength of the baseline smoothness term.
    pub baseline_lambda: f64,
    pub baseline_max_iter: usize,
    /// Fraction of `sum(|x|)` the negative residual mass must fall under to stop.
    pub baseline_converge_tol: f64,
    pub smoothing_kernel: SmoothingKernel,
    /// Order of the difference operator in the baseline penalty.
    pub baseline_difference_order: usize,
    pub centering: Centering,
    pub regression: RegressionMethod,
}
impl Default for ZdffConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 11,
            baseline_lambda: 1e8,
            baseline_max_iter: 50,
            baseline_converge_tol: 1e-3,
            smoothing_kernel: SmoothingKernel::default(),
            baseline_difference_order: 2,
            centering: Centering::default(),
            regression: RegressionMethod::default(),
        }
    }
}
impl ZdffConfig {
    pub fn validate(&self) -> Result<(), ZdffError> {
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(ZdffError::InvalidConfig(format!(
                "smoothing_window must be a positive odd number of samples, got {}",
                self.smoothing_window
            )));
        }
        if !(self.baseline_lambda.is_finite() && self.baseline_lambda > 0.0) {
            return Err(ZdffError::InvalidConfig(format!(
                "baseline_lambda must be positive and finite, got {}",
                self.baseline_lambda
            )));
        }
        if self.baseline_max_iter == 0 {
            return Err(ZdffError::InvalidConfig(
                "baseline_max_iter must be at least 1".into(),
            ));
        }
        if !(self.baseline_converge_tol.is_finite() && self.baseline_converge_tol > 0.0) {
            return Err(ZdffError::InvalidConfig(format!(
                "baseline_converge_tol must be positive and finite, got {}",
                self.baseline_converge_tol
            )));
        }
        if !(1..=3).contains(&self.baseline_difference_order) {
            return Err(ZdffError::InvalidConfig(format!(
                "baseline_difference_order must be 1, 2 or 3, got {}",
                self.baseline_difference_order
            )));
        }
        Ok(())
    }
    /// Shortest aligned pair the pipeline accepts under this configuration.
    pub fn min_samples(&self) -> usize {
        MIN_BASELINE_SAMPLES.max(self.smoothing_window)
    }
}
