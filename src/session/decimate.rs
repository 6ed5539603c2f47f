use std::f64::consts::PI;
use log::debug;
use ndarray::{Array1, ArrayView1};
use crate::session::{PhotometryRecording, SessionError};
/// Rig exports run at ~1 kHz; a factor of 10 brings them down to ~100 Hz.
pub const DEFAULT_DECIMATION: usize = 10;
/// Low-pass filters both channels and keeps every `factor`-th sample.
///
/// The anti-alias filter is a Hamming-windowed sinc with `20 * factor + 1` taps and a cutoff
/// at `1 / factor` of Nyquist, applied forwards over mirrored edges so it adds no phase
/// shift. The time axis is subsampled without filtering. Output length is `ceil(n / factor)`.
pub fn decimate(
    recording: &PhotometryRecording,
    factor: usize,
) -> Result<PhotometryRecording, SessionError> {
    recording.validate()?;
    if factor == 0 {
        return Err(SessionError::InvalidRecording(
            "decimation factor must be at least 1".into(),
        ));
    }
    if factor == 1 {
        return Ok(recording.clone());
    }
    let taps = lowpass_taps(factor);
    let reference = filter_mirrored(recording.reference.view(), &taps);
    let signal = filter_mirrored(recording.signal.view(), &taps);
    let decimated = PhotometryRecording {
        time_seconds: every_nth(recording.time_seconds.view(), factor),
        reference: every_nth(reference.view(), factor),
        signal: every_nth(signal.view(), factor),
        sample_rate_hz: recording.sample_rate_hz / factor as f64,
    };
    debug!(
        "decimated {} -> {} samples ({:.2} Hz)",
        recording.len(),
        decimated.len(),
        decimated.sample_rate_hz
    );
    Ok(decimated)
}
/// Unit-gain windowed-sinc low-pass for a decimation by `factor`.
pub fn lowpass_taps(factor: usize) -> Vec<f64> {
    let len = 20 * factor + 1;
    let centre = (len / 2) as f64;
    let cutoff = 1.0 / factor as f64;
    let mut taps: Vec<f64> = (0..len)
        .map(|k| {
            let x = k as f64 - centre;
            let sinc = if x == 0.0 {
                1.0
            } else {
                (PI * cutoff * x).sin() / (PI * cutoff * x)
            };
            let window = 0.54 - 0.46 * (2.0 * PI * k as f64 / (len - 1) as f64).cos();
            cutoff * sinc * window
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    for tap in &mut taps {
        *tap /= sum;
    }
    taps
}
fn every_nth(values: ArrayView1<'_, f64>, step: usize) -> Array1<f64> {
    values.iter().step_by(step).copied().collect()
}
/// Reflects `idx` into `0..len` without repeating the edge sample, folding as often as needed.
fn reflect(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let folded = idx.rem_euclid(period);
    if folded < len as isize {
        folded as usize
    } else {
        (period - folded) as usize
    }
}
fn filter_mirrored(values: ArrayView1<'_, f64>, taps: &[f64]) -> Array1<f64> {
    let n = values.len();
    let half = (taps.len() / 2) as isize;
    Array1::from_iter((0..n).map(|i| {
        taps.iter()
            .enumerate()
            .map(|(k, w)| w * values[reflect(i as isize + k as isize - half, n)])
            .sum::<f64>()
    }))
}
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    fn recording(n: usize, fs: f64, f: impl Fn(f64) -> f64) -> PhotometryRecording {
        let signal = Array1::from_iter((0..n).map(|i| f(i as f64 / fs)));
        let reference = Array1::from_elem(n, 2.5);
        PhotometryRecording::from_channels(reference, signal, fs).unwrap()
    }
    #[test]
    fn taps_are_symmetric_with_unit_gain() {
        let taps = lowpass_taps(10);
        assert_eq!(taps.len(), 201);
        assert_abs_diff_eq!(taps.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for k in 0..taps.len() {
            assert_abs_diff_eq!(taps[k], taps[taps.len() - 1 - k], epsilon = 1e-15);
        }
    }
    #[test]
    fn output_length_is_ceiling_of_ratio() {
        for (n, q, expected) in [(1000, 10, 100), (1001, 10, 101), (7, 3, 3), (5, 10, 1)] {
            let out = decimate(&recording(n, 1000.0, |t| t), q).unwrap();
            assert_eq!(out.len(), expected, "n = {n}, q = {q}");
            assert_eq!(out.signal.len(), expected);
            assert_eq!(out.reference.len(), expected);
        }
    }
    #[test]
    fn constant_level_is_preserved() {
        let out = decimate(&recording(500, 1000.0, |_| -3.0), 10).unwrap();
        for v in out.reference.iter() {
            assert_abs_diff_eq!(*v, 2.5, epsilon = 1e-12);
        }
        for v in out.signal.iter() {
            assert_abs_diff_eq!(*v, -3.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(out.sample_rate_hz, 100.0);
        assert_eq!(out.time_seconds[1], 0.01);
    }
    #[test]
    fn slow_content_passes_and_aliasing_content_is_removed() {
        let fs = 1000.0;
        let slow = decimate(&recording(4000, fs, |t| (2.0 * PI * 2.0 * t).sin()), 10).unwrap();
        let fast = decimate(&recording(4000, fs, |t| (2.0 * PI * 180.0 * t).sin()), 10).unwrap();
        let interior = |x: &Array1<f64>| x.slice(ndarray::s![40..360]).iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(interior(&slow.signal) > 0.95);
        assert!(interior(&fast.signal) < 0.02);
    }
    #[test]
    fn factor_one_is_identity_and_zero_is_rejected() {
        let rec = recording(50, 100.0, |t| t * t);
        assert_eq!(decimate(&rec, 1).unwrap(), rec);
        assert!(decimate(&rec, 0).is_err());
    }
    #[test]
    fn reflection_folds_repeatedly() {
        assert_eq!(reflect(-1, 4), 1);
        assert_eq!(reflect(4, 4), 2);
        assert_eq!(reflect(7, 4), 1);
        assert_eq!(reflect(-9, 4), 3);
        assert_eq!(reflect(5, 1), 0);
    }
}
