//! From the waveform payload to 12 calibrated leads.
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    conditioning::{Bandpass, Conditioner, ConditioningConfig},
    error::EcgError,
    lead::{LeadSet, MAX_LEADS, reconstitute},
};

/// Decode the base64 text of the waveform element.
///
/// The element text is usually wrapped over many lines, so ASCII whitespace
/// anywhere in `text` is skipped.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, EcgError> {
    let compact = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect::<Vec<_>>();
    Ok(STANDARD.decode(compact)?)
}

/// Decode every chunk of a waveform section and reconstitute the leads.
///
/// All chunks are decoded, so a damaged chunk after the 12th still fails the
/// whole section.
pub fn decode_leads(section: &[u8]) -> Result<LeadSet, EcgError> {
    let mut chunks = xli::decode(section)?;
    if chunks.len() > MAX_LEADS {
        log::debug!(
            "section holds {} chunks, keeping the first {MAX_LEADS}",
            chunks.len()
        );
        chunks.truncate(MAX_LEADS);
    }
    reconstitute(&chunks)
}

/// [`decode_leads`] followed by conditioning of every lead.
pub fn process<F: Bandpass>(
    section: &[u8],
    conditioner: &Conditioner<F>,
) -> Result<LeadSet, EcgError> {
    let leads = decode_leads(section)?;
    Ok(conditioner.condition_leads(&leads))
}

/// Decode and condition with the default 3-45 Hz passband at 500 Hz.
pub fn process_base64(text: &str) -> Result<LeadSet, EcgError> {
    let conditioner = Conditioner::new(&ConditioningConfig::default())?;
    process(&decode_base64(text)?, &conditioner)
}
