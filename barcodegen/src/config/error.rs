//! Error types for configuration resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning caller options into a [`RenderConfig`].
///
/// These are setup failures: they are fatal to the request and reported
/// to the caller before any drawing happens.
///
/// [`RenderConfig`]: crate::config::RenderConfig
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A numeric option could not be parsed as an integer.
    #[error("option '{key}' expects an integer, got '{value}'")]
    InvalidNumber { key: String, value: String },

    /// A boolean option could not be parsed.
    #[error("option '{key}' expects a boolean, got '{value}'")]
    InvalidBoolean { key: String, value: String },

    /// Rotation is not a multiple of 90 degrees.
    #[error("rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i64),

    /// A colour option is not a `RRGGBB` hex triple.
    #[error("option '{key}' expects a hex colour (RRGGBB), got '{value}'")]
    InvalidColor { key: String, value: String },

    /// Font family names a path instead of a file in the font directory.
    #[error("invalid font family name '{0}'")]
    InvalidFontFamily(String),

    /// A symbology-specific attribute was rejected by the encoder.
    #[error("invalid value for '{key}': {reason}")]
    InvalidAttribute { key: String, reason: String },

    /// The configuration file could not be read or parsed.
    #[error("failed to load config file {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },
}
