use ndarray::{s, Array1, ArrayView1};
use crate::zdff::error::{AlignmentError, ChannelRole};
/// Uniformly sampled fluorescence trace.
pub type Channel = Array1<f64>;
/// Signal and reference truncated to a shared length.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelPair {
    pub signal: Channel,
    pub reference: Channel,
}
impl ChannelPair {
    pub fn len(&self) -> usize {
        self.signal.len()
    }
    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }
}
/// Truncates both channels to the shorter length, keeping the earliest samples.
///
/// Acquisition is synchronous per sample index, so nothing is resampled or padded.
pub fn align_channels(
    signal: ArrayView1<'_, f64>,
    reference: ArrayView1<'_, f64>,
    min_len: usize,
) -> Result<ChannelPair, AlignmentError> {
    if signal.is_empty() {
        return Err(AlignmentError::EmptyChannel {
            role: ChannelRole::Signal,
        });
    }
    if reference.is_empty() {
        return Err(AlignmentError::EmptyChannel {
            role: ChannelRole::Reference,
        });
    }
    let len = signal.len().min(reference.len());
    if len < min_len {
        return Err(AlignmentError::TooShort { len, min: min_len });
    }
    let signal = signal.slice(s![..len]);
    let reference = reference.slice(s![..len]);
    ensure_finite(signal, ChannelRole::Signal)?;
    ensure_finite(reference, ChannelRole::Reference)?;
    Ok(ChannelPair {
        signal: signal.to_owned(),
        reference: reference.to_owned(),
    })
}
fn ensure_finite(channel: ArrayView1<'_, f64>, role: ChannelRole) -> Result<(), AlignmentError> {
    match channel.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(AlignmentError::NonFinite { role, index }),
        None => Ok(()),
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    #[test]
    fn truncates_to_shorter_channel() {
        for (n_signal, n_reference) in [(40, 25), (25, 40), (30, 30)] {
            let signal = Array1::from_iter((0..n_signal).map(|i| i as f64));
            let reference = Array1::from_iter((0..n_reference).map(|i| -(i as f64)));
            let pair = align_channels(signal.view(), reference.view(), 10).unwrap();
            let expected = n_signal.min(n_reference);
            assert_eq!(pair.signal.len(), expected);
            assert_eq!(pair.reference.len(), expected);
            assert_eq!(pair.signal[expected - 1], (expected - 1) as f64);
            assert_eq!(pair.reference[0], 0.0);
        }
    }
    #[test]
    fn empty_channels_are_rejected() {
        let full = Array1::<f64>::ones(20);
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(
            align_channels(empty.view(), full.view(), 1),
            Err(AlignmentError::EmptyChannel {
                role: ChannelRole::Signal
            })
        );
        assert_eq!(
            align_channels(full.view(), empty.view(), 1),
            Err(AlignmentError::EmptyChannel {
                role: ChannelRole::Reference
            })
        );
    }
    #[test]
    fn short_pairs_are_rejected() {
        let signal = Array1::<f64>::ones(50);
        let reference = Array1::<f64>::ones(8);
        assert_eq!(
            align_channels(signal.view(), reference.view(), 16),
            Err(AlignmentError::TooShort { len: 8, min: 16 })
        );
    }
    #[test]
    fn non_finite_samples_inside_the_window_are_rejected() {
        let signal = array![1.0, 2.0, f64::NAN, 4.0];
        let reference = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            align_channels(signal.view(), reference.view(), 2),
            Err(AlignmentError::NonFinite {
                role: ChannelRole::Signal,
                index: 2
            })
        );
        // A NaN past the truncation point is dropped with the tail.
        let reference = array![1.0, 2.0, 3.0, 4.0, f64::INFINITY];
        let signal = array![1.0, 2.0, 3.0, 4.0];
        assert!(align_channels(signal.view(), reference.view(), 2).is_ok());
    }
}
