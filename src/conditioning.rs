//! Bandpass filtering and min-max normalization of reconstituted leads.
//!
//! Filtering is allowed to fail per lead (usually because the lead is too
//! short for the filter); that lead is then normalized unfiltered.

use std::f64::consts::PI;

use crate::lead::LeadSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Signal of {len} samples is too short, the filter pads {padlen} samples on each side")]
    SignalTooShort { len: usize, padlen: usize },

    #[error("Passband {low}-{high} Hz must lie strictly between 0 and the Nyquist frequency {nyquist} Hz")]
    InvalidBand { low: f64, high: f64, nyquist: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditioningConfig {
    /// Hz
    pub sampling_rate: f64,
    /// Lower passband edge in Hz
    pub low_cutoff: f64,
    /// Upper passband edge in Hz
    pub high_cutoff: f64,
    /// Filter order as a fraction of the sampling rate
    pub order_factor: f64,
    /// Keeps normalization finite for constant leads
    pub epsilon: f64,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 500.0,
            low_cutoff: 3.0,
            high_cutoff: 45.0,
            order_factor: 0.3,
            epsilon: 1e-8,
        }
    }
}

impl ConditioningConfig {
    pub fn with_sampling_rate(mut self, sampling_rate: f64) -> Self {
        self.sampling_rate = sampling_rate;
        self
    }

    pub fn with_passband(mut self, low: f64, high: f64) -> Self {
        self.low_cutoff = low;
        self.high_cutoff = high;
        self
    }

    pub fn with_order_factor(mut self, order_factor: f64) -> Self {
        self.order_factor = order_factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn order(&self) -> usize {
        (self.order_factor * self.sampling_rate).floor() as usize
    }
}

/// A zero-latency bandpass filter over a whole sequence.
pub trait Bandpass {
    /// Returns a sequence of the same length as `signal`.
    fn apply(&self, signal: &[f64]) -> Result<Vec<f64>, FilterError>;
}

/// Leaves the signal untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Bandpass for Passthrough {
    fn apply(&self, signal: &[f64]) -> Result<Vec<f64>, FilterError> {
        Ok(signal.to_vec())
    }
}

/// Windowed-sinc FIR bandpass run forward and backward.
///
/// Taps use a Hamming window and are scaled to unit gain at the centre of
/// the passband. Before filtering, the signal is extended on both ends by an
/// odd reflection of `3 * taps` samples, and each pass starts in the steady
/// state for its first input sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FirBandpass {
    taps: Vec<f64>,
}

impl FirBandpass {
    /// An even `order` is bumped to the next odd tap count.
    pub fn new(low: f64, high: f64, sampling_rate: f64, order: usize) -> Result<Self, FilterError> {
        let nyquist = sampling_rate / 2.0;
        if !(0.0 < low && low < high && high < nyquist) {
            return Err(FilterError::InvalidBand { low, high, nyquist });
        }
        let numtaps = order | 1;
        let (left, right) = (low / nyquist, high / nyquist);
        let alpha = (numtaps - 1) as f64 / 2.0;

        let mut taps = (0..numtaps)
            .map(|n| {
                let m = n as f64 - alpha;
                (right * sinc(right * m) - left * sinc(left * m)) * hamming(n, numtaps)
            })
            .collect::<Vec<_>>();

        let centre = 0.5 * (left + right);
        let gain: f64 = taps
            .iter()
            .enumerate()
            .map(|(n, h)| h * (PI * (n as f64 - alpha) * centre).cos())
            .sum();
        taps.iter_mut().for_each(|h| *h /= gain);

        Ok(Self { taps })
    }

    pub fn from_config(config: &ConditioningConfig) -> Result<Self, FilterError> {
        Self::new(
            config.low_cutoff,
            config.high_cutoff,
            config.sampling_rate,
            config.order(),
        )
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    fn padlen(&self) -> usize {
        3 * self.taps.len()
    }

    // Direct convolution, with every sample before the start taken to equal
    // the first one.
    fn convolve(&self, x: &[f64]) -> Vec<f64> {
        (0..x.len())
            .map(|n| {
                self.taps
                    .iter()
                    .enumerate()
                    .map(|(k, b)| b * x[n.saturating_sub(k)])
                    .sum::<f64>()
            })
            .collect()
    }
}

impl Bandpass for FirBandpass {
    fn apply(&self, signal: &[f64]) -> Result<Vec<f64>, FilterError> {
        let padlen = self.padlen();
        if signal.len() <= padlen {
            return Err(FilterError::SignalTooShort {
                len: signal.len(),
                padlen,
            });
        }
        let extended = odd_extension(signal, padlen);
        let mut y = self.convolve(&extended);
        y.reverse();
        let mut y = self.convolve(&y);
        y.reverse();
        Ok(y[padlen..padlen + signal.len()].to_vec())
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn hamming(n: usize, len: usize) -> f64 {
    if len == 1 {
        return 1.0;
    }
    0.54 - 0.46 * (2.0 * PI * n as f64 / (len - 1) as f64).cos()
}

/// Reflect `n` samples around each end point. Needs `signal.len() > n`.
fn odd_extension(signal: &[f64], n: usize) -> Vec<f64> {
    let first = signal[0];
    let last = signal[signal.len() - 1];
    let head = signal[1..=n].iter().rev().map(|v| 2.0 * first - v);
    let tail = signal[signal.len() - 1 - n..signal.len() - 1]
        .iter()
        .rev()
        .map(|v| 2.0 * last - v);
    head.chain(signal.iter().copied()).chain(tail).collect()
}

/// Rescale to `[-1, 1]`. `epsilon` keeps constant input finite.
pub fn normalize(signal: &[f64], epsilon: f64) -> Vec<f64> {
    let (min, max) = signal
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    signal
        .iter()
        .map(|v| 2.0 * (v - min) / (max - min + epsilon) - 1.0)
        .collect()
}

/// Filters and normalizes each lead on its own.
pub struct Conditioner<F = FirBandpass> {
    filter: F,
    epsilon: f64,
}

impl Conditioner<FirBandpass> {
    pub fn new(config: &ConditioningConfig) -> Result<Self, FilterError> {
        Ok(Self {
            filter: FirBandpass::from_config(config)?,
            epsilon: config.epsilon,
        })
    }
}

impl<F: Bandpass> Conditioner<F> {
    pub fn with_filter(filter: F, epsilon: f64) -> Self {
        Self { filter, epsilon }
    }

    /// Filter then normalize. A lead the filter rejects is normalized as is.
    pub fn condition(&self, signal: &[f64]) -> Vec<f64> {
        match self.filter.apply(signal) {
            Ok(filtered) => normalize(&filtered, self.epsilon),
            Err(e) => {
                log::warn!("passing lead through unfiltered: {e}");
                normalize(signal, self.epsilon)
            }
        }
    }

    pub fn condition_leads(&self, leads: &LeadSet) -> LeadSet {
        leads.map(|lead, samples| {
            log::trace!("conditioning lead {lead}");
            self.condition(samples)
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use proptest::{collection::vec, prelude::proptest, prop_assert, prop_assume};

    use super::*;

    fn sine(freq: f64, len: usize, fs: f64) -> Vec<f64> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f64 / fs).sin())
            .collect()
    }

    fn rms(xs: &[f64]) -> f64 {
        (xs.iter().map(|x| x * x).sum::<f64>() / xs.len() as f64).sqrt()
    }

    #[test]
    fn test_default_order() {
        let config = ConditioningConfig::default();
        assert_eq!(config.order(), 150);
        let filter = FirBandpass::from_config(&config).unwrap();
        assert_eq!(filter.taps().len(), 151);
    }

    #[test]
    fn test_taps_symmetric() {
        let filter = FirBandpass::new(3.0, 45.0, 500.0, 150).unwrap();
        let taps = filter.taps();
        for (a, b) in taps.iter().zip(taps.iter().rev()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_band() {
        assert!(matches!(
            FirBandpass::new(45.0, 3.0, 500.0, 150),
            Err(FilterError::InvalidBand { .. })
        ));
        assert!(FirBandpass::new(3.0, 250.0, 500.0, 150).is_err());
    }

    #[test]
    fn test_passband_and_stopband() {
        let filter = FirBandpass::new(3.0, 45.0, 500.0, 150).unwrap();
        let len = 5000;
        let inside = filter.apply(&sine(20.0, len, 500.0)).unwrap();
        let outside = filter.apply(&sine(120.0, len, 500.0)).unwrap();
        assert_eq!(inside.len(), len);
        assert_eq!(outside.len(), len);
        let mid = 1000..4000;
        assert!((rms(&inside[mid.clone()]) - 0.5f64.sqrt()).abs() < 0.05);
        assert!(rms(&outside[mid]) < 0.01);
    }

    #[test]
    fn test_short_signal_rejected() {
        let filter = FirBandpass::new(3.0, 45.0, 500.0, 150).unwrap();
        let res = filter.apply(&[1.0; 453]);
        assert_eq!(
            res,
            Err(FilterError::SignalTooShort {
                len: 453,
                padlen: 453
            })
        );
    }

    #[test]
    fn test_short_signal_passes_through() {
        let _ = env_logger::builder().is_test(true).try_init();
        let conditioner = Conditioner::new(&ConditioningConfig::default()).unwrap();
        let out = conditioner.condition(&[0.0, 5.0, 10.0]);
        assert_eq!(out.len(), 3);
        assert!((out[0] + 1.0).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_odd_extension() {
        let xs = [1.0, 2.0, 4.0, 7.0];
        assert_eq!(
            odd_extension(&xs, 2),
            [-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]
        );
    }

    #[test]
    fn test_normalize_constant() {
        let out = normalize(&[4.0; 10], 1e-8);
        assert!(out.iter().all(|v| v.is_finite()));
        assert!(out.iter().all(|&v| v == -1.0));
        assert!(normalize(&[], 1e-8).is_empty());
    }

    proptest! {
        #[test]
        fn proptest_normalize_bounds(ref xs in vec(-1.0e4f64..1.0e4, 2..200)) {
            let min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assume!(max - min > 1e-3);
            let out = normalize(xs, 1e-8);
            let lo = out.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = out.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!((lo + 1.0).abs() < 1e-6);
            prop_assert!((hi - 1.0).abs() < 1e-6);
        }
    }
}
