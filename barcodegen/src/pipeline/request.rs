//! A single render request.

use crate::config::RenderOptions;
use crate::error::BarcodeResult;
use crate::render::OutputFormat;

/// Query key holding the symbology identifier.
pub const CODE_KEY: &str = "code";
/// Query key holding the text to encode.
pub const TEXT_KEY: &str = "text";
/// Query key holding the output format name.
pub const FILETYPE_KEY: &str = "filetype";

/// Symbology used when a query names none.
pub const DEFAULT_SYMBOLOGY: &str = "code128";

/// What to render: symbology, text, format and options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRequest {
    symbology: String,
    text: String,
    format: OutputFormat,
    options: RenderOptions,
}

impl BarcodeRequest {
    pub fn new(symbology: impl Into<String>, text: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            symbology: symbology.into(),
            text: text.into(),
            format,
            options: RenderOptions::new(),
        }
    }

    /// Replace the options bag.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a single option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Build a request from the legacy query form, e.g.
    /// `code=BCGcode128&text=ABC&filetype=PNG&scale=2`.
    ///
    /// `code` defaults to `code128`, `text` to empty and `filetype` to PNG;
    /// every other pair becomes an option.
    ///
    /// # Errors
    ///
    /// [`BarcodeError::UnsupportedFormat`](crate::BarcodeError::UnsupportedFormat)
    /// if `filetype` names no supported format.
    pub fn from_query(query: &str) -> BarcodeResult<Self> {
        let mut options = RenderOptions::from_query(query);
        let symbology = options
            .remove(CODE_KEY)
            .unwrap_or_else(|| DEFAULT_SYMBOLOGY.to_string());
        let text = options.remove(TEXT_KEY).unwrap_or_default();
        let format = match options.remove(FILETYPE_KEY) {
            Some(name) => name.parse()?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            symbology,
            text,
            format,
            options,
        })
    }

    pub fn symbology(&self) -> &str {
        &self.symbology
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}
