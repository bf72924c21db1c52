//! Top-level error type for barcode generation.

use thiserror::Error;

use crate::config::ConfigError;
use crate::font::FontError;
use crate::render::OutputError;

/// Errors returned to the caller of a render.
///
/// Encoding problems are absent on purpose: they are rendered into a
/// placeholder image instead of failing the request.
#[derive(Debug, Error)]
pub enum BarcodeError {
    /// The symbology identifier is not a plain alphanumeric name.
    #[error("invalid symbology identifier '{0}'")]
    InvalidSymbology(String),

    /// The identifier is well formed but nothing is registered under it.
    #[error("no encoder registered for symbology '{0}'")]
    EncoderNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load font: {0}")]
    FontLoad(#[from] FontError),

    /// The requested output format is not PNG, JPEG or GIF.
    #[error("unsupported output format '{0}' (expected PNG, JPEG or GIF)")]
    UnsupportedFormat(String),

    #[error("failed to encode output image: {0}")]
    Output(#[from] OutputError),
}

impl BarcodeError {
    /// Whether the error comes from symbology selection.
    ///
    /// Such requests can still be answered with the generic error image.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            BarcodeError::InvalidSymbology(_) | BarcodeError::EncoderNotFound(_)
        )
    }
}

/// Result type for barcode generation.
pub type BarcodeResult<T> = Result<T, BarcodeError>;
