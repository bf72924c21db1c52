//! The encoder trait and its symbology-family variants.

use std::fmt;

use crate::config::{Color, ConfigError, TrackingCode};
use crate::config::Latin1Text;
use crate::font::Font;
use crate::symbology::{EncodeError, EncodedSymbol, SymbolStyle};

/// Turns text into an [`EncodedSymbol`] for one symbology.
///
/// Encoders are created fresh for every render by the
/// [`EncoderRegistry`](super::EncoderRegistry), configured once, then asked
/// to parse once. Shared appearance settings live in a [`SymbolStyle`];
/// family-specific settings are reached through [`BarcodeEncoder::variant`].
///
/// # Thread Safety
///
/// An encoder is owned by a single render, but must be `Send` so renders
/// can run on worker threads.
pub trait BarcodeEncoder: Send {
    /// Canonical symbology identifier, e.g. `code128`.
    fn name(&self) -> &'static str;

    fn style(&self) -> &SymbolStyle;

    fn style_mut(&mut self) -> &mut SymbolStyle;

    /// Pixels per module.
    fn set_scale(&mut self, scale: u32) {
        self.style_mut().scale = scale;
    }

    /// Bar height in modules.
    fn set_thickness(&mut self, thickness: u32) {
        self.style_mut().thickness = thickness;
    }

    fn set_foreground_color(&mut self, color: Color) {
        self.style_mut().foreground = color;
    }

    fn set_background_color(&mut self, color: Color) {
        self.style_mut().background = color;
    }

    /// Caption font; `None` suppresses the caption.
    fn set_font(&mut self, font: Option<Font>) {
        self.style_mut().font = font;
    }

    /// Encode `text`.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] when the text cannot be represented in
    /// this symbology. The caller renders such errors as a placeholder.
    fn parse(&self, text: &Latin1Text) -> Result<EncodedSymbol, EncodeError>;

    /// A symbol with no bars, carrying the current style.
    fn blank(&self) -> EncodedSymbol {
        EncodedSymbol::blank(self.style().clone())
    }

    /// Family-specific configuration surface.
    ///
    /// The default is [`Variant::Plain`]: nothing beyond the shared style.
    fn variant(&mut self) -> Variant<'_> {
        Variant::Plain
    }
}

/// Symbologies with a selectable start code set.
pub trait StartSelect {
    /// `None` lets the encoder choose.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidAttribute`] if `start` names no known set.
    fn set_start(&mut self, start: Option<&str>) -> Result<(), ConfigError>;
}

/// Symbologies with an optional check character.
pub trait ChecksumSelect {
    fn set_checksum(&mut self, enabled: bool);
}

/// Symbologies driven by a separate tracking code.
pub trait TrackingSetup {
    /// # Errors
    ///
    /// [`ConfigError::InvalidAttribute`] if a field is out of range.
    fn set_tracking_code(&mut self, code: TrackingCode) -> Result<(), ConfigError>;
}

/// Symbologies with a free-form caption label.
pub trait LabelSetup {
    fn set_label(&mut self, label: &str);
}

/// The family an encoder belongs to, with access to its extra settings.
pub enum Variant<'a> {
    Sequential(&'a mut dyn StartSelect),
    Checksummed(&'a mut dyn ChecksumSelect),
    Tracking(&'a mut dyn TrackingSetup),
    Labelled(&'a mut dyn LabelSetup),
    Plain,
}

impl Variant<'_> {
    pub fn family(&self) -> Family {
        match self {
            Variant::Sequential(_) => Family::Sequential,
            Variant::Checksummed(_) => Family::Checksummed,
            Variant::Tracking(_) => Family::Tracking,
            Variant::Labelled(_) => Family::Labelled,
            Variant::Plain => Family::Plain,
        }
    }
}

/// [`Variant`] without the borrow, for listing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Sequential,
    Checksummed,
    Tracking,
    Labelled,
    Plain,
}

impl Family {
    /// Option keys this family reads, beyond the shared ones.
    pub fn option_keys(self) -> &'static [&'static str] {
        use crate::config::keys;
        match self {
            Family::Sequential => &[keys::START],
            Family::Checksummed => &[keys::CHECKSUM],
            Family::Tracking => &[
                keys::BARCODE_IDENTIFIER,
                keys::SERVICE_TYPE,
                keys::MAILER_IDENTIFIER,
                keys::SERIAL_NUMBER,
            ],
            Family::Labelled => &[keys::LABEL],
            Family::Plain => &[],
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Sequential => "sequential",
            Family::Checksummed => "checksummed",
            Family::Tracking => "tracking",
            Family::Labelled => "labelled",
            Family::Plain => "plain",
        };
        f.pad(name)
    }
}
