use log::debug;
use ndarray::{Array1, ArrayView1};
use crate::zdff::channel::Channel;
use crate::zdff::config::RegressionMethod;
use crate::zdff::standardize::median;
/// Huber tuning constant (95% efficiency under Gaussian noise).
const HUBER_K: f64 = 1.345;
/// MAD to standard deviation under Gaussian noise.
const MAD_SCALE: f64 = 0.6745;
const ROBUST_MAX_ITER: usize = 50;
const ROBUST_TOL: f64 = 1e-10;
/// Slopes below this are treated as "reference explains nothing".
pub const MIN_INFORMATIVE_SLOPE: f64 = 0.05;
/// Standardized channels should not need more than this gain.
pub const MAX_PLAUSIBLE_SLOPE: f64 = 2.0;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeAssessment {
    Informative,
    NearZero,
    Negative,
    Excessive,
}
#[derive(Clone, Debug, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// `slope * reference + intercept`, the motion/bleaching estimate.
    pub predicted: Channel,
    pub method: RegressionMethod,
    pub iterations: usize,
    pub r_squared: f64,
}
impl RegressionResult {
    /// Reports whether the reference looks like a usable motion regressor.
    pub fn assess_slope(&self) -> SlopeAssessment {
        if self.slope < 0.0 {
            SlopeAssessment::Negative
        } else if self.slope < MIN_INFORMATIVE_SLOPE {
            SlopeAssessment::NearZero
        } else if self.slope > MAX_PLAUSIBLE_SLOPE {
            SlopeAssessment::Excessive
        } else {
            SlopeAssessment::Informative
        }
    }
}
/// Regresses `signal` on `reference` and returns the fitted line over `reference`.
pub fn fit_motion(
    signal: ArrayView1<'_, f64>,
    reference: ArrayView1<'_, f64>,
    method: RegressionMethod,
) -> RegressionResult {
    let uniform = vec![1.0; signal.len()];
    let (mut slope, mut intercept) = weighted_line(signal, reference, &uniform);
    let mut iterations = 1;
    match method {
        RegressionMethod::Ordinary => {}
        RegressionMethod::NonNegative => {
            if slope < 0.0 {
                slope = 0.0;
                intercept = signal.mean().unwrap_or(0.0);
            }
        }
        RegressionMethod::Robust => {
            let mut weights = uniform;
            while iterations < ROBUST_MAX_ITER {
                let residuals: Vec<f64> = signal
                    .iter()
                    .zip(reference.iter())
                    .map(|(y, x)| y - (slope * x + intercept))
                    .collect();
                let abs_residuals = Array1::from_iter(residuals.iter().map(|r| r.abs()));
                let scale = median(abs_residuals.view()) / MAD_SCALE;
                if scale <= f64::EPSILON * (1.0 + intercept.abs() + slope.abs()) {
                    break;
                }
                let cutoff = HUBER_K * scale;
                for (w, r) in weights.iter_mut().zip(&residuals) {
                    *w = if r.abs() <= cutoff { 1.0 } else { cutoff / r.abs() };
                }
                let (next_slope, next_intercept) = weighted_line(signal, reference, &weights);
                iterations += 1;
                let change = (next_slope - slope).abs() + (next_intercept - intercept).abs();
                slope = next_slope;
                intercept = next_intercept;
                if change <= ROBUST_TOL * (1.0 + slope.abs() + intercept.abs()) {
                    break;
                }
            }
        }
    }
    let predicted = reference.mapv(|x| slope * x + intercept);
    let r_squared = coefficient_of_determination(signal, predicted.view());
    debug!("motion fit ({method:?}): slope {slope:.4}, intercept {intercept:.4}, r2 {r_squared:.4}");
    RegressionResult {
        slope,
        intercept,
        predicted,
        method,
        iterations,
        r_squared,
    }
}
/// Weighted least-squares line `y ≈ slope * x + intercept`.
fn weighted_line(y: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>, weights: &[f64]) -> (f64, f64) {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return (0.0, 0.0);
    }
    let (mut mx, mut my) = (0.0, 0.0);
    for ((xi, yi), w) in x.iter().zip(y.iter()).zip(weights) {
        mx += w * xi;
        my += w * yi;
    }
    mx /= total;
    my /= total;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for ((xi, yi), w) in x.iter().zip(y.iter()).zip(weights) {
        let dx = xi - mx;
        sxy += w * dx * (yi - my);
        sxx += w * dx * dx;
    }
    if sxx <= 0.0 {
        return (0.0, my);
    }
    let slope = sxy / sxx;
    (slope, my - slope * mx)
}
fn coefficient_of_determination(y: ArrayView1<'_, f64>, fitted: ArrayView1<'_, f64>) -> f64 {
    let mean = y.mean().unwrap_or(0.0);
    let total: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let residual: f64 = y.iter().zip(fitted.iter()).map(|(v, f)| (v - f).powi(2)).sum();
    1.0 - residual / total
}
