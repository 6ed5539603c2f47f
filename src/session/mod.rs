// src/session/mod.rs
pub mod camera;
pub mod decimate;
pub mod error;
pub mod export;
pub mod naming;
pub mod plot;
pub mod recording;
pub mod runner;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use log::info;
use crate::zdff::ZdffConfig;
pub use camera::{align_camera, read_camera_onsets, FrameSample};
pub use decimate::{decimate, DEFAULT_DECIMATION};
pub use error::SessionError;
pub use export::{write_frames_csv, write_session_csv};
pub use naming::{bids_name, BlockName};
pub use plot::{render_session_png, PlotStyle};
pub use recording::{ColumnNames, CsvRecordingSource, ManualSource, PhotometryRecording, RecordingSource};
pub use runner::{
    run_session, smoothing_window, SessionOptions, SessionZdff, DEFAULT_N_REMOVE,
    DEFAULT_SMOOTHING_SECONDS,
};
/// Reads a [`ZdffConfig`] from a JSON file; absent fields keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<ZdffConfig, SessionError> {
    let path = path.as_ref();
    info!("loading config from {}", path.display());
    config_from_reader(BufReader::new(File::open(path)?))
}
pub fn config_from_reader<R: Read>(reader: R) -> Result<ZdffConfig, SessionError> {
    let config: ZdffConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}
