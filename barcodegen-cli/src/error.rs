//! CLI error type.

use std::io;
use std::path::PathBuf;

use barcodegen::config::ConfigError;
use barcodegen::BarcodeError;
use thiserror::Error;

/// Errors that end a CLI invocation with exit status 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Barcode(#[from] BarcodeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to write image to stdout: {0}")]
    Stdout(#[source] io::Error),

    #[error("{0}")]
    Usage(String),
}
