use std::fs::File;
use std::io::Read;
use std::path::Path;
use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use crate::session::SessionError;
use crate::zdff::Channel;
/// One photometry block: a shared time axis plus the isosbestic and calcium channels.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotometryRecording {
    pub time_seconds: Array1<f64>,
    /// Isosbestic (~405 nm) channel.
    pub reference: Channel,
    /// Calcium-dependent (~465 nm) channel.
    pub signal: Channel,
    pub sample_rate_hz: f64,
}
impl PhotometryRecording {
    /// Builds a recording from two channels sampled at `sample_rate_hz`, starting at t = 0.
    pub fn from_channels(
        reference: Channel,
        signal: Channel,
        sample_rate_hz: f64,
    ) -> Result<Self, SessionError> {
        let time_seconds = Array1::from_iter((0..reference.len()).map(|i| i as f64 / sample_rate_hz));
        let recording = Self {
            time_seconds,
            reference,
            signal,
            sample_rate_hz,
        };
        recording.validate()?;
        Ok(recording)
    }
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(self.sample_rate_hz > 0.0) || !self.sample_rate_hz.is_finite() {
            return Err(SessionError::InvalidRecording(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        let n = self.time_seconds.len();
        if n == 0 {
            return Err(SessionError::InvalidRecording("recording has no samples".into()));
        }
        if self.reference.len() != n || self.signal.len() != n {
            return Err(SessionError::InvalidRecording(format!(
                "column lengths differ: time {n}, reference {}, signal {}",
                self.reference.len(),
                self.signal.len()
            )));
        }
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.time_seconds.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time_seconds.is_empty()
    }
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate_hz
    }
}
/// Anything that can hand over a full recording.
pub trait RecordingSource {
    fn load(&mut self) -> Result<PhotometryRecording, SessionError>;
}
/// Header names of the three columns a recording table must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnNames {
    pub time: String,
    pub reference: String,
    pub signal: String,
}
impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            time: "time_seconds".into(),
            reference: "_405".into(),
            signal: "_465".into(),
        }
    }
}
/// Reads a headered CSV export of a rig block. Extra columns are ignored.
pub struct CsvRecordingSource<R> {
    reader: R,
    columns: ColumnNames,
}
impl CsvRecordingSource<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        info!("reading recording from {}", path.display());
        Ok(Self::from_reader(File::open(path)?))
    }
}
impl<R: Read> CsvRecordingSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            columns: ColumnNames::default(),
        }
    }
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }
}
impl<R: Read> RecordingSource for CsvRecordingSource<R> {
    fn load(&mut self) -> Result<PhotometryRecording, SessionError> {
        let mut rdr = csv::Reader::from_reader(&mut self.reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| SessionError::MissingColumn(name.to_string()))
        };
        let indices = [
            column(&self.columns.time)?,
            column(&self.columns.reference)?,
            column(&self.columns.signal)?,
        ];
        let mut data: [Vec<f64>; 3] = Default::default();
        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            for (values, &idx) in data.iter_mut().zip(&indices) {
                let field = record.get(idx).unwrap_or("").trim();
                let value: f64 = field.parse().map_err(|_| {
                    SessionError::InvalidRecording(format!(
                        "row {}: `{field}` in column `{}` is not a number",
                        row + 1,
                        &headers[idx]
                    ))
                })?;
                values.push(value);
            }
        }
        let [time, reference, signal] = data;
        let time_seconds = Array1::from(time);
        let sample_rate_hz = infer_sample_rate(time_seconds.view())?;
        debug!(
            "parsed {} rows, inferred sample rate {sample_rate_hz:.3} Hz",
            time_seconds.len()
        );
        let recording = PhotometryRecording {
            time_seconds,
            reference: Array1::from(reference),
            signal: Array1::from(signal),
            sample_rate_hz,
        };
        recording.validate()?;
        Ok(recording)
    }
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    recording: PhotometryRecording,
}
impl ManualSource {
    pub fn new(recording: PhotometryRecording) -> Self {
        Self { recording }
    }
}
impl RecordingSource for ManualSource {
    fn load(&mut self) -> Result<PhotometryRecording, SessionError> {
        self.recording.validate()?;
        Ok(self.recording.clone())
    }
}
/// Sampling rate from the median step of a strictly increasing time axis.
pub fn infer_sample_rate(time_seconds: ArrayView1<'_, f64>) -> Result<f64, SessionError> {
    if time_seconds.len() < 2 {
        return Err(SessionError::InvalidTimestamps(format!(
            "need at least two samples to infer a sample rate, got {}",
            time_seconds.len()
        )));
    }
    let mut steps = Vec::with_capacity(time_seconds.len() - 1);
    for (i, pair) in time_seconds.windows(2).into_iter().enumerate() {
        let step = pair[1] - pair[0];
        if !(step > 0.0) || !step.is_finite() {
            return Err(SessionError::InvalidTimestamps(format!(
                "time must increase strictly, but sample {} is at {} after {}",
                i + 1,
                pair[1],
                pair[0]
            )));
        }
        steps.push(step);
    }
    steps.sort_by(f64::total_cmp);
    let median_step = steps[steps.len() / 2];
    Ok(1.0 / median_step)
}
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    #[test]
    fn reads_named_columns_in_any_order() {
        let table = "_465,extra,time_seconds,_405\n\
                     2.0,x,0.00,1.0\n\
                     2.5,y,0.01,1.1\n\
                     3.0,z,0.02,1.2\n\
                     3.5,w,0.03,1.3\n";
        let recording = CsvRecordingSource::from_reader(table.as_bytes()).load().unwrap();
        assert_eq!(recording.len(), 4);
        assert_eq!(recording.signal, array![2.0, 2.5, 3.0, 3.5]);
        assert_eq!(recording.reference, array![1.0, 1.1, 1.2, 1.3]);
        assert_abs_diff_eq!(recording.sample_rate_hz, 100.0, epsilon = 1e-9);
    }
    #[test]
    fn custom_column_names_are_honoured() {
        let table = "t,iso,gcamp\n0,1,2\n0.5,1,3\n1.0,1,4\n";
        let columns = ColumnNames {
            time: "t".into(),
            reference: "iso".into(),
            signal: "gcamp".into(),
        };
        let recording = CsvRecordingSource::from_reader(table.as_bytes())
            .with_columns(columns)
            .load()
            .unwrap();
        assert_eq!(recording.signal, array![2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(recording.sample_rate_hz, 2.0, epsilon = 1e-12);
    }
    #[test]
    fn missing_column_is_named() {
        let table = "time_seconds,_405\n0,1\n1,2\n";
        let err = CsvRecordingSource::from_reader(table.as_bytes()).load().unwrap_err();
        assert!(matches!(err, SessionError::MissingColumn(name) if name == "_465"));
    }
    #[test]
    fn unparsable_cell_is_rejected() {
        let table = "time_seconds,_405,_465\n0,1,2\n1,nan?,3\n";
        let err = CsvRecordingSource::from_reader(table.as_bytes()).load().unwrap_err();
        assert!(matches!(err, SessionError::InvalidRecording(_)));
    }
    #[test]
    fn sample_rate_uses_the_median_step() {
        // one dropped sample must not skew the estimate
        let time = array![0.0, 0.1, 0.2, 0.4, 0.5, 0.6];
        assert_abs_diff_eq!(infer_sample_rate(time.view()).unwrap(), 10.0, epsilon = 1e-9);
        let backwards = array![0.0, 0.1, 0.05];
        assert!(matches!(
            infer_sample_rate(backwards.view()),
            Err(SessionError::InvalidTimestamps(_))
        ));
        assert!(infer_sample_rate(array![1.0].view()).is_err());
    }
    #[test]
    fn manual_source_replays_its_recording() {
        let recording =
            PhotometryRecording::from_channels(array![1.0, 2.0, 3.0], array![4.0, 5.0, 6.0], 4.0).unwrap();
        assert_eq!(recording.time_seconds, array![0.0, 0.25, 0.5]);
        assert_abs_diff_eq!(recording.duration_seconds(), 0.75);
        let mut source = ManualSource::new(recording.clone());
        assert_eq!(source.load().unwrap(), recording);
        assert_eq!(source.load().unwrap(), recording);
    }
    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(PhotometryRecording::from_channels(array![1.0, 2.0], array![1.0], 10.0).is_err());
        assert!(PhotometryRecording::from_channels(array![1.0], array![1.0], 0.0).is_err());
    }
}
