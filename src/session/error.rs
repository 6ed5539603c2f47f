use thiserror::Error;
use crate::zdff::ZdffError;
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Zdff(#[from] ZdffError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("column `{0}` not found in header")]
    MissingColumn(String),
    #[error("invalid recording: {0}")]
    InvalidRecording(String),
    #[error("invalid timestamps: {0}")]
    InvalidTimestamps(String),
    #[error("invalid block or session name: {0}")]
    InvalidName(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
