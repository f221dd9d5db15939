//! This implements the waveform compression used in Philips Sierra ECG XML
//! files (XLI).
//!
//! The base64-decoded waveform section is a run of chunks, one per lead. Each
//! chunk is an 8-byte little-endian header followed by an LZW payload:
//!
//! ```text
//! [payload length: i32 LE][unused: 2 bytes][delta seed: i16 LE][payload]
//! ```
//!
//! Decoding a payload goes LZW -> pad to even -> byte planes -> second-order
//! delta. Chunks carry no padding between them and there is no terminator;
//! the section simply ends once fewer than a header's worth of bytes remain.

pub mod bitstream;
pub mod delta;
mod error;
pub mod lzw;
pub mod plane;

pub use error::XliError;

/// Width of every code word in the compressed stream.
pub const CODE_WIDTH: u32 = 10;

/// Largest usable code. Anything above it ends the stream.
pub const MAX_CODE: u16 = 1022;

/// Offset applied to every stored delta correction.
pub const DELTA_BIAS: i32 = 64;

pub const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: i32,
    pub seed: i16,
}

impl ChunkHeader {
    pub fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        let length = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        // bytes 4..6 are not used by the decoder
        let seed = i16::from_le_bytes([bytes[6], bytes[7]]);
        Self { length, seed }
    }

    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&self.length.to_le_bytes());
        bytes[6..].copy_from_slice(&self.seed.to_le_bytes());
        bytes
    }
}

/// One decoded lead and where it sat in the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChunk {
    pub offset: usize,
    pub next_offset: usize,
    pub seed: i16,
    pub samples: Vec<i32>,
}

/// Decode the chunk starting at `offset`.
///
/// Returns `Ok(None)` when fewer than [`HEADER_LEN`] bytes remain, which is
/// the normal end of a section.
pub fn read_chunk(section: &[u8], offset: usize) -> Result<Option<DecodedChunk>, XliError> {
    let Some(rest) = section.get(offset..) else {
        return Ok(None);
    };
    let Some((header, rest)) = rest.split_first_chunk::<HEADER_LEN>() else {
        return Ok(None);
    };
    let header = ChunkHeader::from_bytes(*header);
    let declared = usize::try_from(header.length).map_err(|_| XliError::NegativeChunkLength {
        offset,
        declared: header.length,
    })?;
    let payload = rest.get(..declared).ok_or(XliError::TruncatedChunk {
        offset,
        declared,
        available: rest.len(),
    })?;

    let samples = decode_payload(payload, header.seed)?;
    log::debug!(
        "chunk at {offset}: {declared} payload bytes, seed {}, {} samples",
        header.seed,
        samples.len()
    );
    Ok(Some(DecodedChunk {
        offset,
        next_offset: offset + HEADER_LEN + declared,
        seed: header.seed,
        samples,
    }))
}

/// LZW -> pad to even -> byte planes -> second-order delta
pub fn decode_payload(payload: &[u8], seed: i16) -> Result<Vec<i32>, XliError> {
    let mut bytes = lzw::decompress(payload)?;
    plane::pad_to_even(&mut bytes);
    let mut samples = plane::unpack(&bytes)
        .into_iter()
        .map(i32::from)
        .collect::<Vec<_>>();
    delta::decode(&mut samples, seed as i32);
    Ok(samples)
}

/// Walks every chunk of a waveform section in order.
///
/// Stops after the first error.
pub struct Chunks<'a> {
    section: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    pub fn new(section: &'a [u8]) -> Self {
        Self {
            section,
            offset: 0,
            done: false,
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Result<DecodedChunk, XliError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_chunk(self.section, self.offset) {
            Ok(Some(chunk)) => {
                self.offset = chunk.next_offset;
                Some(Ok(chunk))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode all chunks of a section into one sample array per chunk.
pub fn decode(section: &[u8]) -> Result<Vec<Vec<i32>>, XliError> {
    Chunks::new(section).map(|c| c.map(|c| c.samples)).collect()
}

/// delta -> byte planes -> LZW, with the header in front.
///
/// The last sample's stored slot is never read back, so any value decodes to
/// the same result; it is written as [`DELTA_BIAS`].
pub fn encode_chunk(samples: &[i32]) -> Result<Vec<u8>, XliError> {
    let (raw, seed) = delta::encode(samples)?;
    let payload = lzw::compress(&plane::pack(&raw));
    let length = i32::try_from(payload.len()).map_err(|_| XliError::PayloadTooLarge { len: payload.len() })?;

    let mut chunk = ChunkHeader { length, seed }.to_bytes().to_vec();
    chunk.extend_from_slice(&payload);
    Ok(chunk)
}

/// Encode a full section, one chunk per lead.
pub fn encode<S: AsRef<[i32]>>(leads: &[S]) -> Result<Vec<u8>, XliError> {
    let mut section = Vec::new();
    for lead in leads {
        section.extend(encode_chunk(lead.as_ref())?);
    }
    Ok(section)
}
