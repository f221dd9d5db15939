#[derive(thiserror::Error, Debug)]
pub enum XliError {
    /// Header declares more payload than the section holds
    #[error("Chunk at offset {offset} declares {declared} payload bytes but only {available} remain")]
    TruncatedChunk {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("Chunk at offset {offset} declares a negative payload length ({declared})")]
    NegativeChunkLength { offset: usize, declared: i32 },

    /// First code of a stream is not a single byte, so there is no previous
    /// string to extend
    #[error("Compressed stream starts with undefined code {code}")]
    UnknownLeadingCode { code: u16 },

    #[error("Raw value {value} at index {index} does not fit in 16 bits")]
    SampleOutOfRange { index: usize, value: i64 },

    #[error("Delta seed {value} does not fit in 16 bits")]
    SeedOutOfRange { value: i64 },

    #[error("Payload of {len} bytes does not fit in a chunk header")]
    PayloadTooLarge { len: usize },
}
