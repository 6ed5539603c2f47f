// src/zdff/mod.rs
pub mod banded;
pub mod baseline;
pub mod channel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod regression;
pub mod smooth;
pub mod standardize;
// Re-export the pipeline surface so callers can `use photozdff::zdff::*`.
pub use baseline::{fit_baseline, BaselineDiagnostics, BaselineFit, BaselineParams};
pub use channel::{align_channels, Channel, ChannelPair};
pub use config::{Centering, RegressionMethod, SmoothingKernel, ZdffConfig, MIN_BASELINE_SAMPLES};
pub use error::{AlignmentError, BaselineConvergenceWarning, ChannelRole, ZdffError};
pub use pipeline::{compute_zdff, ZdffResult};
pub use regression::{fit_motion, RegressionResult, SlopeAssessment};
pub use smooth::smooth;
pub use standardize::standardize;
