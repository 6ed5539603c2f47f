use log::info;
use ndarray::{s, Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use crate::session::{PhotometryRecording, SessionError};
use crate::zdff::{compute_zdff, AlignmentError, ZdffConfig, ZdffError, ZdffResult};
/// Samples dropped from the start of a block, where LED warm-up bleaching is steepest.
pub const DEFAULT_N_REMOVE: usize = 5000;
/// Smoothing duration the command line uses when neither a duration nor a config file is given.
pub const DEFAULT_SMOOTHING_SECONDS: f64 = 1.0;
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub n_remove: usize,
    /// Overrides `ZdffConfig::smoothing_window` with a duration at the recording's rate.
    pub smoothing_seconds: Option<f64>,
}
impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            n_remove: DEFAULT_N_REMOVE,
            smoothing_seconds: None,
        }
    }
}
/// A recording together with its zdFF trace, padded back to full length.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionZdff {
    pub recording: PhotometryRecording,
    /// Zero for the first `n_removed` samples.
    pub zdff: Array1<f64>,
    pub n_removed: usize,
    /// Core result over the kept samples only.
    pub core: ZdffResult,
}
impl SessionZdff {
    pub fn len(&self) -> usize {
        self.zdff.len()
    }
    pub fn is_empty(&self) -> bool {
        self.zdff.is_empty()
    }
    pub fn time_seconds(&self) -> ArrayView1<'_, f64> {
        self.recording.time_seconds.view()
    }
}
/// Odd window covering at least `seconds` at `sample_rate_hz`.
pub fn smoothing_window(seconds: f64, sample_rate_hz: f64) -> Result<usize, SessionError> {
    if !(seconds > 0.0) || !seconds.is_finite() {
        return Err(ZdffError::InvalidConfig(format!(
            "smoothing duration must be positive and finite, got {seconds}"
        ))
        .into());
    }
    let samples = ((seconds * sample_rate_hz).ceil() as usize).max(1);
    Ok(if samples % 2 == 0 { samples + 1 } else { samples })
}
/// Runs the zdFF pipeline over everything after the first `n_remove` samples.
pub fn run_session(
    recording: &PhotometryRecording,
    options: &SessionOptions,
    config: &ZdffConfig,
) -> Result<SessionZdff, SessionError> {
    recording.validate()?;
    let mut config = config.clone();
    if let Some(seconds) = options.smoothing_seconds {
        config.smoothing_window = smoothing_window(seconds, recording.sample_rate_hz)?;
    }
    config.validate()?;
    let n = recording.len();
    let kept = n.saturating_sub(options.n_remove);
    if kept < config.min_samples() {
        return Err(ZdffError::from(AlignmentError::TooShort {
            len: kept,
            min: config.min_samples(),
        })
        .into());
    }
    let start = options.n_remove;
    let core = compute_zdff(
        recording.signal.slice(s![start..]),
        recording.reference.slice(s![start..]),
        &config,
    )?;
    let mut zdff = Array1::zeros(n);
    zdff.slice_mut(s![start..]).assign(&core.trace);
    info!(
        "zdFF over {kept} of {n} samples (window {}, slope {:.3}, {} convergence warnings)",
        config.smoothing_window,
        core.regression.slope,
        core.warnings.len()
    );
    Ok(SessionZdff {
        recording: recording.clone(),
        zdff,
        n_removed: start,
        core,
    })
}
