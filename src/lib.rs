//! Decoding the 12-lead waveforms embedded in Philips Sierra ECG XML files.
//!
//! The XML carries the waveforms as one base64 blob compressed with XLI (see
//! the [`xli`] crate). This crate turns that blob into leads:
//!
//! 1. base64 -> waveform section ([`decode_base64`])
//! 2. section -> one sample array per chunk ([`xli::decode`])
//! 3. chunks -> reconstituted limb leads ([`lead::reconstitute`])
//! 4. each lead -> bandpass filtered and scaled to `[-1, 1]`
//!    ([`conditioning::Conditioner`])
//!
//! Reading the XML itself is left to the caller.
pub use xli;

pub mod conditioning;
pub mod error;
pub mod lead;
pub mod waveform;

pub use conditioning::{Conditioner, ConditioningConfig};
pub use error::EcgError;
pub use lead::{Lead, LeadSet};
pub use waveform::{decode_base64, decode_leads, process, process_base64};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // Two chunks holding the literal bytes [0, 0, 1, 1] with seed 0.
    const TWO_LITERAL_CHUNKS: [u8; 30] = [
        0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x04, 0x01, 0x00, 0x00, //
        0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x04, 0x01, 0x00, 0x00,
    ];

    #[test]
    fn test_two_chunk_section() -> eyre::Result<()> {
        let chunks = xli::Chunks::new(&TWO_LITERAL_CHUNKS).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[1].offset, 15);
        for chunk in &chunks {
            assert_eq!(chunk.seed, 0);
            assert_eq!(chunk.samples, [1, 1]);
        }
        // two leads are not enough to rebuild the limb leads
        assert!(matches!(
            decode_leads(&TWO_LITERAL_CHUNKS),
            Err(EcgError::InsufficientLeads { found: 2 })
        ));
        Ok(())
    }

    #[test]
    fn test_empty_section() {
        assert!(matches!(
            decode_leads(&[]),
            Err(EcgError::InsufficientLeads { found: 0 })
        ));
    }

    #[test]
    fn test_twelve_literal_chunks() -> eyre::Result<()> {
        let section = TWO_LITERAL_CHUNKS.repeat(6);
        let leads = decode_leads(&section)?;
        assert_eq!(leads.len(), 12);
        // I = II = [1, 1] and every stored residual is [1, 1]
        assert_eq!(leads.get(Lead::III).unwrap(), [-1.0, -1.0]);
        assert_eq!(leads.get(Lead::AVR).unwrap(), [-2.0, -2.0]);
        assert_eq!(leads.get(Lead::AVL).unwrap(), [0.0, 0.0]);
        assert_eq!(leads.get(Lead::AVF).unwrap(), [-1.0, -1.0]);
        assert_eq!(leads.get(Lead::V6).unwrap(), [1.0, 1.0]);
        Ok(())
    }
}
