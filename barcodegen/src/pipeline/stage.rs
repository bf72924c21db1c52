//! Render stages, for logging.

use std::fmt;

/// Where a render is in its lifecycle.
///
/// A render moves strictly forward through
/// `Configuring → Encoding → Rendering → Emitting`. An encoding failure
/// moves to `Faulted` instead of `Rendering`; a faulted render still emits
/// (a placeholder image).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Selecting the encoder, resolving options, loading the font.
    Configuring,
    /// Encoding the text into a symbol.
    Encoding,
    /// Rasterising the symbol.
    Rendering,
    /// Encoding failed; drawing a placeholder.
    Faulted,
    /// Serialising the raster into the output format.
    Emitting,
}

impl RenderStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configuring => "configuring",
            Self::Encoding => "encoding",
            Self::Rendering => "rendering",
            Self::Faulted => "faulted",
            Self::Emitting => "emitting",
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
