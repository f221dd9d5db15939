//! Second-order predictive delta stage.
//!
//! Each sample is predicted by linear extrapolation from the two before it.
//! The stored value at `i` carries the correction for `i + 1`, offset by
//! [`DELTA_BIAS`]. The correction for index 2 has no stored slot and travels
//! in the chunk header as the seed. The last stored value is never read.

use crate::{DELTA_BIAS, error::XliError};

/// Reconstruct samples in place. The first two samples are literal.
///
/// Arithmetic wraps at 32 bits.
pub fn decode(samples: &mut [i32], seed: i32) {
    if samples.len() < 2 {
        return;
    }
    let (mut x, mut y) = (samples[0], samples[1]);
    let mut last = seed;
    for v in samples[2..].iter_mut() {
        let z = y.wrapping_mul(2).wrapping_sub(x).wrapping_sub(last);
        last = v.wrapping_sub(DELTA_BIAS);
        *v = z;
        x = y;
        y = z;
    }
}

/// Inverse of [`decode`]: returns the raw 16-bit stream and the seed.
pub fn encode(samples: &[i32]) -> Result<(Vec<i16>, i16), XliError> {
    let n = samples.len();
    let s = |i: usize| samples[i] as i64;

    let mut raw = Vec::with_capacity(n);
    for i in 0..n {
        let value = match i {
            0 | 1 => s(i),
            _ if i + 1 < n => 2 * s(i) - s(i - 1) - s(i + 1) + DELTA_BIAS as i64,
            _ => DELTA_BIAS as i64,
        };
        let value = i16::try_from(value).map_err(|_| XliError::SampleOutOfRange { index: i, value })?;
        raw.push(value);
    }

    let seed = if n >= 3 { 2 * s(1) - s(0) - s(2) } else { 0 };
    let seed = i16::try_from(seed).map_err(|_| XliError::SeedOutOfRange { value: seed })?;
    Ok((raw, seed))
}
