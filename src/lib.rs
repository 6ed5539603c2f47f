//! Fiber-photometry zdFF extraction.
//!
//! [`zdff`] is the pure numeric core: channel alignment, smoothing, airPLS baseline removal,
//! standardization and isosbestic motion correction. [`session`] wraps it with the plumbing a
//! single recording needs: CSV input, decimation, start trimming, camera frame alignment,
//! export and preview rendering.
pub mod session;
pub mod zdff;
pub use zdff::{compute_zdff, ZdffConfig, ZdffError, ZdffResult};
