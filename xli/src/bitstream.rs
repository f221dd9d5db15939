//! Fixed-width code words packed most significant bit first.
//!
//! The reader keeps a 32-bit accumulator and only releases a code once more
//! than 24 bits are buffered. A stream that runs dry before that point ends,
//! even if enough bits for one more code were technically present. There is
//! no stop code in the format, so running dry is the only way a stream ends.

use crate::CODE_WIDTH;

const ACCUMULATOR_BITS: u32 = 32;
const FILL_THRESHOLD: u32 = 24;

pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    width: u32,
    buffer: u32,
    count: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_width(data, CODE_WIDTH)
    }

    /// Width must be in `1..=16`.
    pub fn with_width(data: &'a [u8], width: u32) -> Self {
        debug_assert!((1..=16).contains(&width));
        Self {
            data,
            pos: 0,
            width,
            buffer: 0,
            count: 0,
        }
    }

    /// Number of input bytes pulled into the accumulator so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Next code word, or `None` once the input is exhausted mid-fill.
    pub fn read_code(&mut self) -> Option<u16> {
        while self.count <= FILL_THRESHOLD {
            let byte = *self.data.get(self.pos)?;
            self.buffer |= (byte as u32) << (FILL_THRESHOLD - self.count);
            self.count += 8;
            self.pos += 1;
        }
        let code = ((self.buffer >> (ACCUMULATOR_BITS - self.width)) & 0xFFFF) as u16;
        self.buffer <<= self.width;
        self.count -= self.width;
        Some(code)
    }
}

impl Iterator for BitReader<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_code()
    }
}

/// Packs code words in the layout [`BitReader`] expects.
pub struct BitWriter {
    bytes: Vec<u8>,
    width: u32,
    buffer: u32,
    count: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_width(CODE_WIDTH)
    }

    pub fn with_width(width: u32) -> Self {
        debug_assert!((1..=16).contains(&width));
        Self {
            bytes: Vec::new(),
            width,
            buffer: 0,
            count: 0,
        }
    }

    pub fn write_code(&mut self, code: u16) {
        let mask = (1u32 << self.width) - 1;
        self.buffer = (self.buffer << self.width) | (code as u32 & mask);
        self.count += self.width;
        while self.count >= 8 {
            self.count -= 8;
            self.bytes.push((self.buffer >> self.count) as u8);
        }
        self.buffer &= (1u32 << self.count) - 1;
    }

    /// Flush the partial byte and append the two zero bytes the reader needs
    /// to get past its fill threshold for the final code.
    pub fn finish(mut self) -> Vec<u8> {
        if self.count > 0 {
            self.bytes.push((self.buffer << (8 - self.count)) as u8);
        }
        self.bytes.extend_from_slice(&[0, 0]);
        self.bytes
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}
