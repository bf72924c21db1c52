//! Encoding errors.
//!
//! These are data problems with the text being encoded. The pipeline never
//! returns them to the caller as a failure; it renders them into a
//! placeholder image instead.

use thiserror::Error;

/// Errors raised by [`BarcodeEncoder::parse`](super::BarcodeEncoder::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A character the symbology cannot represent.
    #[error("{symbology}: character '{character}' at position {position} cannot be encoded")]
    InvalidCharacter {
        symbology: &'static str,
        character: char,
        position: usize,
    },

    /// Too few, too many or the wrong parity of characters.
    #[error("{symbology}: {reason}")]
    InvalidLength {
        symbology: &'static str,
        reason: String,
    },

    /// Characters are individually valid but the data is malformed.
    #[error("{symbology}: {reason}")]
    InvalidStructure {
        symbology: &'static str,
        reason: String,
    },

    /// Intelligent Mail needs a tracking code before it can encode.
    #[error("intelligentmail: tracking code has not been set")]
    MissingTrackingCode,
}

impl EncodeError {
    pub(crate) fn invalid_character(symbology: &'static str, byte: u8, position: usize) -> Self {
        EncodeError::InvalidCharacter {
            symbology,
            character: char::from(byte),
            position,
        }
    }

    pub(crate) fn length(symbology: &'static str, reason: impl Into<String>) -> Self {
        EncodeError::InvalidLength {
            symbology,
            reason: reason.into(),
        }
    }

    pub(crate) fn structure(symbology: &'static str, reason: impl Into<String>) -> Self {
        EncodeError::InvalidStructure {
            symbology,
            reason: reason.into(),
        }
    }
}
