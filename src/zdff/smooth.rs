use std::f64::consts::PI;
use ndarray::{Array1, ArrayView1};
use crate::zdff::channel::Channel;
use crate::zdff::config::SmoothingKernel;
use crate::zdff::error::{AlignmentError, ZdffError};
/// Low-pass smooths `channel` with an odd `window`, returning a channel of the same length.
///
/// Window kernels read past the ends through a mirror that does not repeat the edge sample;
/// [`SmoothingKernel::LocalLinear`] instead truncates its neighbourhood and fits a line.
pub fn smooth(
    channel: ArrayView1<'_, f64>,
    window: usize,
    kernel: SmoothingKernel,
) -> Result<Channel, ZdffError> {
    if window % 2 == 0 {
        return Err(ZdffError::InvalidConfig(format!(
            "smoothing window must be odd, got {window}"
        )));
    }
    if channel.len() < window {
        return Err(AlignmentError::TooShort {
            len: channel.len(),
            min: window,
        }
        .into());
    }
    if window < 3 {
        return Ok(channel.to_owned());
    }
    let smoothed = match kernel {
        SmoothingKernel::Flat => moving_average(channel, window),
        SmoothingKernel::LocalLinear => local_linear(channel, window),
        tapered => convolve_mirrored(channel, &taper(tapered, window)),
    };
    Ok(smoothed)
}
fn mirror_index(idx: isize, len: usize) -> usize {
    let last = len as isize - 1;
    let folded = if idx < 0 {
        -idx
    } else if idx > last {
        2 * last - idx
    } else {
        idx
    };
    folded as usize
}
fn moving_average(channel: ArrayView1<'_, f64>, window: usize) -> Channel {
    let n = channel.len();
    let half = (window / 2) as isize;
    // prefix[k] = sum of the first k mirrored samples, starting at index -half
    let mut prefix = Vec::with_capacity(n + window);
    prefix.push(0.0);
    let mut acc = 0.0;
    for k in -half..(n as isize + half) {
        acc += channel[mirror_index(k, n)];
        prefix.push(acc);
    }
    let scale = 1.0 / window as f64;
    Array1::from_iter((0..n).map(|i| (prefix[i + window] - prefix[i]) * scale))
}
fn taper(kernel: SmoothingKernel, window: usize) -> Vec<f64> {
    let m = (window - 1) as f64;
    let weights: Vec<f64> = (0..window)
        .map(|k| {
            let k = k as f64;
            match kernel {
                SmoothingKernel::Hanning => 0.5 - 0.5 * (2.0 * PI * k / m).cos(),
                SmoothingKernel::Hamming => 0.54 - 0.46 * (2.0 * PI * k / m).cos(),
                SmoothingKernel::Bartlett => 1.0 - (2.0 * k / m - 1.0).abs(),
                SmoothingKernel::Blackman => {
                    0.42 - 0.5 * (2.0 * PI * k / m).cos() + 0.08 * (4.0 * PI * k / m).cos()
                }
                SmoothingKernel::Flat | SmoothingKernel::LocalLinear => 1.0,
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
fn convolve_mirrored(channel: ArrayView1<'_, f64>, weights: &[f64]) -> Channel {
    let n = channel.len();
    let half = (weights.len() / 2) as isize;
    Array1::from_iter((0..n as isize).map(|i| {
        weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * channel[mirror_index(i + k as isize - half, n)])
            .sum::<f64>()
    }))
}
fn local_linear(channel: ArrayView1<'_, f64>, window: usize) -> Channel {
    let n = channel.len();
    let half = window / 2;
    let span = (half + 1) as f64;
    let tricube: Vec<f64> = (0..=half)
        .map(|d| {
            let u = d as f64 / span;
            (1.0 - u * u * u).powi(3)
        })
        .collect();
    Array1::from_iter((0..n).map(|i| {
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(n - 1);
        let (mut sw, mut swx, mut swxx, mut swy, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for j in lo..=hi {
            let x = j as f64 - i as f64;
            let w = tricube[i.abs_diff(j)];
            let y = channel[j];
            sw += w;
            swx += w * x;
            swxx += w * x * x;
            swy += w * y;
            swxy += w * x * y;
        }
        let det = sw * swxx - swx * swx;
        if det.abs() <= f64::EPSILON * sw * swxx.max(1.0) {
            swy / sw
        } else {
            // intercept of the weighted line, i.e. its value at the centre sample
            (swxx * swy - swx * swxy) / det
        }
    }))
}
