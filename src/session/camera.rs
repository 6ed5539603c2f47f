use std::io::Read;
use log::debug;
use ndarray::ArrayView1;
use serde::Serialize;
use crate::session::{SessionError, SessionZdff};
/// zdFF value at the photometry sample nearest to one camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameSample {
    pub frame: usize,
    pub onset_seconds: f64,
    pub sample_index: usize,
    #[serde(rename = "zdFF")]
    pub zdff: f64,
}
/// Maps each camera frame onset to its nearest photometry sample.
///
/// Onsets must be finite and non-decreasing. Ties go to the earlier sample; onsets outside
/// the recording clamp to its first or last sample.
pub fn align_camera(session: &SessionZdff, onsets: &[f64]) -> Result<Vec<FrameSample>, SessionError> {
    check_onsets(onsets)?;
    let time = session.time_seconds();
    if time.is_empty() {
        return Err(SessionError::InvalidRecording("recording has no samples".into()));
    }
    let mut cursor = 0;
    let frames: Vec<FrameSample> = onsets
        .iter()
        .enumerate()
        .map(|(frame, &onset)| {
            cursor = nearest_sample(time, onset, cursor);
            FrameSample {
                frame,
                onset_seconds: onset,
                sample_index: cursor,
                zdff: session.zdff[cursor],
            }
        })
        .collect();
    debug!("aligned {} camera frames", frames.len());
    Ok(frames)
}
fn check_onsets(onsets: &[f64]) -> Result<(), SessionError> {
    if let Some(i) = onsets.iter().position(|t| !t.is_finite()) {
        return Err(SessionError::InvalidTimestamps(format!(
            "camera onset {i} is not finite"
        )));
    }
    if let Some(i) = onsets.windows(2).position(|w| w[1] < w[0]) {
        return Err(SessionError::InvalidTimestamps(format!(
            "camera onsets go backwards at frame {}: {} after {}",
            i + 1,
            onsets[i + 1],
            onsets[i]
        )));
    }
    Ok(())
}
/// Nearest index to `onset` in the sorted axis `time`, scanning forward from `start`.
fn nearest_sample(time: ArrayView1<'_, f64>, onset: f64, start: usize) -> usize {
    let last = time.len() - 1;
    let mut i = start;
    while i < last && time[i + 1] <= onset {
        i += 1;
    }
    if i < last && onset > time[i] && time[i + 1] - onset < onset - time[i] {
        i + 1
    } else {
        i
    }
}
/// Reads frame onsets (seconds) from a headered CSV column.
pub fn read_camera_onsets<R: Read>(reader: R, column: &str) -> Result<Vec<f64>, SessionError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let idx = rdr
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| SessionError::MissingColumn(column.to_string()))?;
    let mut onsets = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = record.get(idx).unwrap_or("").trim();
        let onset: f64 = field.parse().map_err(|_| {
            SessionError::InvalidTimestamps(format!("row {}: `{field}` is not a time", row + 1))
        })?;
        onsets.push(onset);
    }
    check_onsets(&onsets)?;
    Ok(onsets)
}
