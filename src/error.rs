use xli::XliError;

use crate::{conditioning::FilterError, lead::Lead};

#[derive(Debug, thiserror::Error)]
pub enum EcgError {
    #[error("Failed to decode waveform section: {0}")]
    Xli(#[from] XliError),

    #[error("Waveform payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Need at least 6 leads to reconstitute the limb leads, found {found}")]
    InsufficientLeads { found: usize },

    #[error("Lead {lead} has {found} samples but its reference leads only have {expected}")]
    LeadLengthMismatch {
        lead: Lead,
        expected: usize,
        found: usize,
    },

    #[error("Invalid filter configuration: {0}")]
    Filter(#[from] FilterError),
}
