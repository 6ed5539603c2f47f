use std::fmt;
use thiserror::Error;
/// Which side of the photometry pair a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// Calcium-dependent channel (465 nm).
    Signal,
    /// Isosbestic control channel (405 nm).
    Reference,
}
impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRole::Signal => f.write_str("signal"),
            ChannelRole::Reference => f.write_str("reference"),
        }
    }
}
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("{role} channel is empty")]
    EmptyChannel { role: ChannelRole },
    #[error("aligned length {len} is below the minimum window of {min} samples")]
    TooShort { len: usize, min: usize },
    #[error("{role} channel has a non-finite sample at index {index}")]
    NonFinite { role: ChannelRole, index: usize },
}
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ZdffError {
    #[error("alignment failed: {0}")]
    Alignment(#[from] AlignmentError),
    #[error("{role} channel has zero variance and cannot be standardized")]
    DegenerateChannel { role: ChannelRole },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("baseline solver failed: {0}")]
    Solver(String),
}
/// Non-fatal: the airPLS loop ran out of iterations before the weights settled.
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineConvergenceWarning {
    pub role: ChannelRole,
    pub iterations: usize,
    pub negative_residual_norm: f64,
}
impl fmt::Display for BaselineConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} baseline did not converge after {} iterations (negative residual norm {:.4e})",
            self.role, self.iterations, self.negative_residual_norm
        )
    }
}
