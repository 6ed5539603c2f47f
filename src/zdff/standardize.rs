use ndarray::ArrayView1;
use crate::zdff::channel::Channel;
use crate::zdff::config::Centering;
use crate::zdff::error::{ChannelRole, ZdffError};
/// Standard deviation below this fraction of the channel magnitude counts as flat.
const FLAT_RELATIVE_STD: f64 = 1e-12;
/// A detrended residual whose spread is below this fraction of the raw channel's magnitude
/// is solver round-off: the baseline absorbed the whole channel.
const NEGLIGIBLE_RESIDUAL_RELATIVE_STD: f64 = 1e-6;
/// Population mean and standard deviation.
pub fn mean_std(channel: ArrayView1<'_, f64>) -> (f64, f64) {
    if channel.is_empty() {
        return (0.0, 0.0);
    }
    let n = channel.len() as f64;
    let mean = channel.sum() / n;
    let variance = channel
        .iter()
        .map(|v| {
            let delta = v - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}
pub fn median(channel: ArrayView1<'_, f64>) -> f64 {
    let mut sorted = channel.to_vec();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}
/// Largest absolute value, 0 for an empty channel.
pub fn magnitude(channel: ArrayView1<'_, f64>) -> f64 {
    channel.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
/// True when the spread is indistinguishable from rounding noise on the channel's level.
pub fn is_flat(channel: ArrayView1<'_, f64>) -> bool {
    let (mean, std) = mean_std(channel);
    !(std > FLAT_RELATIVE_STD * magnitude(channel).max(mean.abs()))
}
/// True when `residual` carries no spread worth standardizing next to `magnitude`, the size
/// of the channel it was detrended from.
pub fn is_negligible(residual: ArrayView1<'_, f64>, magnitude: f64) -> bool {
    let (_, std) = mean_std(residual);
    !(std > NEGLIGIBLE_RESIDUAL_RELATIVE_STD * magnitude)
}
/// Z-scores `channel`: `(x - centre) / std`, population standard deviation.
pub fn standardize(
    channel: ArrayView1<'_, f64>,
    centering: Centering,
    role: ChannelRole,
) -> Result<Channel, ZdffError> {
    if is_flat(channel) {
        return Err(ZdffError::DegenerateChannel { role });
    }
    let (mean, std) = mean_std(channel);
    let centre = match centering {
        Centering::Mean => mean,
        Centering::Median => median(channel),
    };
    Ok(channel.mapv(|v| (v - centre) / std))
}
