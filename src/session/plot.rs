use std::io::Cursor;
use image::{ImageFormat, RgbImage};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use crate::session::{SessionError, SessionZdff};
/// Colours and size of the session preview. The preview carries no text, so it renders
/// without any system fonts.
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub reference: RGBColor,
    pub signal: RGBColor,
    pub baseline: RGBColor,
    pub trace: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            background: RGBColor(10, 10, 10),
            reference: RGBColor(120, 80, 220),
            signal: GREEN,
            baseline: WHITE,
            trace: CYAN,
        }
    }
}
/// Two stacked panels: raw channels with their fitted baselines on top, zdFF below.
pub fn render_session_png(session: &SessionZdff, style: &PlotStyle) -> Result<Vec<u8>, SessionError> {
    if session.is_empty() {
        return Err(SessionError::Plot("session has no samples".into()));
    }
    let time = session.time_seconds();
    let x_range = time[0]..time[time.len() - 1].max(time[0] + f64::EPSILON);
    let recording = &session.recording;
    let kept_time = time.slice(ndarray::s![session.n_removed..]);
    let reference_baseline = &session.core.reference_baseline.baseline;
    let signal_baseline = &session.core.signal_baseline.baseline;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background).map_err(drawing_failed)?;
        let panels = root.split_evenly((2, 1));
        let raw_bounds = bounds(
            recording
                .reference
                .iter()
                .chain(recording.signal.iter())
                .chain(reference_baseline.iter())
                .chain(signal_baseline.iter()),
        );
        let mut raw = ChartBuilder::on(&panels[0])
            .margin(10)
            .build_cartesian_2d(x_range.clone(), raw_bounds.0..raw_bounds.1)
            .map_err(drawing_failed)?;
        for (values, color) in [
            (recording.reference.view(), style.reference),
            (recording.signal.view(), style.signal),
        ] {
            let series = time.iter().copied().zip(values.iter().copied());
            raw.draw_series(LineSeries::new(series, &color))
                .map_err(drawing_failed)?;
        }
        for baseline in [reference_baseline, signal_baseline] {
            let series = kept_time.iter().copied().zip(baseline.iter().copied());
            raw.draw_series(LineSeries::new(series, &style.baseline))
                .map_err(drawing_failed)?;
        }
        let trace_bounds = bounds(session.zdff.iter());
        let mut trace = ChartBuilder::on(&panels[1])
            .margin(10)
            .build_cartesian_2d(x_range.clone(), trace_bounds.0..trace_bounds.1)
            .map_err(drawing_failed)?;
        let zero = [(x_range.start, 0.0), (x_range.end, 0.0)];
        trace
            .draw_series(LineSeries::new(zero, &style.baseline))
            .map_err(drawing_failed)?;
        let series = time.iter().copied().zip(session.zdff.iter().copied());
        trace
            .draw_series(LineSeries::new(series, &style.trace))
            .map_err(drawing_failed)?;
        root.present().map_err(drawing_failed)?;
    }
    // The backend leaves packed RGB rows in `buffer`.
    let frame = RgbImage::from_raw(style.width, style.height, buffer)
        .ok_or_else(|| SessionError::Plot("frame buffer does not match the preview size".into()))?;
    let mut png = Cursor::new(Vec::new());
    frame
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| SessionError::Plot(format!("png encoding failed: {err}")))?;
    Ok(png.into_inner())
}
fn drawing_failed<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> SessionError {
    SessionError::Plot(format!("drawing failed: {err}"))
}
fn bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if !lo.is_finite() {
        (-1.0, 1.0)
    } else if hi - lo < f64::EPSILON * (1.0 + lo.abs()) {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = 0.05 * (hi - lo);
        (lo - pad, hi + pad)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{run_session, PhotometryRecording, SessionOptions};
    use crate::zdff::ZdffConfig;
    use ndarray::Array1;
    #[test]
    fn renders_a_png_of_the_requested_size() {
        let n = 400;
        let reference = Array1::from_iter((0..n).map(|i| 1.0 + 0.2 * (i as f64 * 0.1).sin()));
        let signal = Array1::from_iter((0..n).map(|i| 2.0 + 0.2 * (i as f64 * 0.1).sin() + 0.05 * (i as f64 * 0.7).cos()));
        let recording = PhotometryRecording::from_channels(reference, signal, 40.0).unwrap();
        let options = SessionOptions {
            n_remove: 40,
            smoothing_seconds: None,
        };
        let session = run_session(&recording, &options, &ZdffConfig::default()).unwrap();
        let style = PlotStyle {
            width: 320,
            height: 200,
            ..PlotStyle::default()
        };
        let png = render_session_png(&session, &style).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 200));
        let corner = decoded.to_rgb8().get_pixel(0, 0).0;
        let RGBColor(r, g, b) = style.background;
        assert_eq!(corner, [r, g, b]);
    }
    #[test]
    fn degenerate_ranges_are_padded() {
        let flat = [3.0, 3.0, 3.0];
        assert_eq!(bounds(flat.iter()), (2.0, 4.0));
        assert_eq!(bounds([f64::NAN].iter()), (-1.0, 1.0));
        let (lo, hi) = bounds([0.0, 10.0].iter());
        assert!(lo < 0.0 && hi > 10.0);
    }
}
