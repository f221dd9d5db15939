//! Byte-plane layout: every high byte of the block first, then every low byte.

/// Zero-pad a decompressed block to an even length.
pub fn pad_to_even(bytes: &mut Vec<u8>) {
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
}

/// Recombine the two planes into signed 16-bit samples.
///
/// A trailing odd byte is ignored; callers pad with [`pad_to_even`] first.
pub fn unpack(bytes: &[u8]) -> Vec<i16> {
    let half = bytes.len() / 2;
    let (high, low) = bytes.split_at(half);
    high.iter()
        .zip(low)
        .map(|(&hi, &lo)| i16::from_be_bytes([hi, lo]))
        .collect()
}

pub fn pack(samples: &[i16]) -> Vec<u8> {
    let (high, low): (Vec<u8>, Vec<u8>) = samples
        .iter()
        .map(|v| {
            let [hi, lo] = v.to_be_bytes();
            (hi, lo)
        })
        .unzip();
    let mut bytes = high;
    bytes.extend(low);
    bytes
}
