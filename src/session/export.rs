use std::io::Write;
use log::debug;
use crate::session::{FrameSample, SessionError, SessionZdff};
/// Writes one row per sample: `time_seconds,_405,_465,zdFF`, plus the two fitted
/// baselines when `with_baselines` is set. Baseline cells before the trimmed start are empty.
pub fn write_session_csv<W: Write>(
    writer: W,
    session: &SessionZdff,
    with_baselines: bool,
) -> Result<(), SessionError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["time_seconds", "_405", "_465", "zdFF"];
    if with_baselines {
        header.extend(["_405_baseline", "_465_baseline"]);
    }
    wtr.write_record(&header)?;
    let recording = &session.recording;
    let reference_baseline = &session.core.reference_baseline.baseline;
    let signal_baseline = &session.core.signal_baseline.baseline;
    let mut row = Vec::with_capacity(header.len());
    for i in 0..session.len() {
        row.clear();
        row.push(recording.time_seconds[i].to_string());
        row.push(recording.reference[i].to_string());
        row.push(recording.signal[i].to_string());
        row.push(session.zdff[i].to_string());
        if with_baselines {
            match i.checked_sub(session.n_removed) {
                Some(j) => {
                    row.push(reference_baseline[j].to_string());
                    row.push(signal_baseline[j].to_string());
                }
                None => row.extend([String::new(), String::new()]),
            }
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    debug!("wrote {} session rows", session.len());
    Ok(())
}
/// Writes `frame,onset_seconds,sample_index,zdFF`, one row per camera frame.
pub fn write_frames_csv<W: Write>(writer: W, frames: &[FrameSample]) -> Result<(), SessionError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if frames.is_empty() {
        wtr.write_record(["frame", "onset_seconds", "sample_index", "zdFF"])?;
    }
    for frame in frames {
        wtr.serialize(frame)?;
    }
    wtr.flush()?;
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{align_camera, run_session, CsvRecordingSource, PhotometryRecording, RecordingSource, SessionOptions};
    use crate::zdff::ZdffConfig;
    use ndarray::Array1;
    fn session(n_remove: usize) -> SessionZdff {
        let n = 600;
        let reference = Array1::from_iter((0..n).map(|i| 2.0 + 0.3 * (i as f64 * 0.05).sin() + 0.001 * i as f64));
        let signal = Array1::from_iter((0..n).map(|i| {
            4.0 + 0.3 * (i as f64 * 0.05).sin() + (-((i as f64 - 400.0) / 10.0).powi(2)).exp()
        }));
        let recording = PhotometryRecording::from_channels(reference, signal, 20.0).unwrap();
        let options = SessionOptions {
            n_remove,
            smoothing_seconds: None,
        };
        run_session(&recording, &options, &ZdffConfig::default()).unwrap()
    }
    fn to_string(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }
    #[test]
    fn session_table_reads_back_as_a_recording() {
        let session = session(0);
        let mut out = Vec::new();
        write_session_csv(&mut out, &session, false).unwrap();
        let text = to_string(out);
        assert!(text.starts_with("time_seconds,_405,_465,zdFF\n"));
        assert_eq!(text.lines().count(), 601);
        let restored = CsvRecordingSource::from_reader(text.as_bytes()).load().unwrap();
        assert_eq!(restored.time_seconds, session.recording.time_seconds);
        assert_eq!(restored.reference, session.recording.reference);
        assert_eq!(restored.signal, session.recording.signal);
        assert!((restored.sample_rate_hz - 20.0).abs() < 1e-6);
    }
    #[test]
    fn baseline_cells_are_blank_before_the_trimmed_start() {
        let session = session(50);
        let mut out = Vec::new();
        write_session_csv(&mut out, &session, true).unwrap();
        let text = to_string(out);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("time_seconds,_405,_465,zdFF,_405_baseline,_465_baseline")
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 600);
        assert!(rows[49].ends_with(",0,,"));
        let cells: Vec<&str> = rows[50].split(',').collect();
        assert_eq!(cells.len(), 6);
        let baseline: f64 = cells[4].parse().unwrap();
        assert_eq!(baseline, session.core.reference_baseline.baseline[0]);
    }
    #[test]
    fn frame_table_has_one_row_per_frame() {
        let session = session(0);
        let frames = align_camera(&session, &[0.0, 1.02, 29.0]).unwrap();
        let mut out = Vec::new();
        write_frames_csv(&mut out, &frames).unwrap();
        let text = to_string(out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "frame,onset_seconds,sample_index,zdFF");
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("1,1.02,20,"));
        let mut empty = Vec::new();
        write_frames_csv(&mut empty, &[]).unwrap();
        assert_eq!(to_string(empty), "frame,onset_seconds,sample_index,zdFF\n");
    }
}
