//! The encoded symbol: a symbology-neutral description of bars and spaces.

use crate::config::{Color, DEFAULT_SCALE, DEFAULT_THICKNESS};
use crate::font::Font;

/// Quiet zone, in modules, on each side of a linear symbol.
pub const DEFAULT_QUIET_ZONE: u32 = 10;

/// Vertical extent of a bar.
///
/// Linear symbologies only use [`BarExtent::Full`]. The four-state
/// extents are used by height-modulated symbologies such as Intelligent
/// Mail, where the tracker is the middle third of the bar height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarExtent {
    #[default]
    Full,
    Ascender,
    Descender,
    Tracker,
}

/// One bar or space, `width` modules wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub width: u32,
    pub dark: bool,
    pub extent: BarExtent,
}

impl Run {
    pub const fn bar(width: u32) -> Self {
        Self {
            width,
            dark: true,
            extent: BarExtent::Full,
        }
    }

    pub const fn space(width: u32) -> Self {
        Self {
            width,
            dark: false,
            extent: BarExtent::Full,
        }
    }

    /// A one-module bar of the given extent.
    pub const fn state(extent: BarExtent) -> Self {
        Self {
            width: 1,
            dark: true,
            extent,
        }
    }
}

/// Shared appearance settings carried by every encoder.
#[derive(Debug, Clone)]
pub struct SymbolStyle {
    /// Pixels per module.
    pub scale: u32,
    /// Bar height in modules.
    pub thickness: u32,
    pub foreground: Color,
    pub background: Color,
    /// Caption font; no caption is drawn without one.
    pub font: Option<Font>,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            thickness: DEFAULT_THICKNESS,
            foreground: Color::BLACK,
            background: Color::WHITE,
            font: None,
        }
    }
}

/// The result of a successful encode, ready for rasterisation.
#[derive(Debug, Clone)]
pub struct EncodedSymbol {
    runs: Vec<Run>,
    caption: Option<String>,
    checksum: Option<String>,
    quiet_zone: u32,
    style: SymbolStyle,
}

impl EncodedSymbol {
    pub fn new(style: SymbolStyle, runs: Vec<Run>) -> Self {
        Self {
            runs,
            caption: None,
            checksum: None,
            quiet_zone: DEFAULT_QUIET_ZONE,
            style,
        }
    }

    /// A symbol with no bars, used when there is nothing to encode.
    pub fn blank(style: SymbolStyle) -> Self {
        Self::new(style, Vec::new())
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Human-readable text drawn below the bars.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Check character(s) computed during encoding, if any.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn quiet_zone(&self) -> u32 {
        self.quiet_zone
    }

    pub fn style(&self) -> &SymbolStyle {
        &self.style
    }

    /// Total width of all runs, in modules, excluding quiet zones.
    pub fn width_modules(&self) -> u32 {
        self.runs.iter().map(|run| run.width).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Append `widths` as alternating runs, starting with a bar.
pub(crate) fn push_pattern(runs: &mut Vec<Run>, widths: &[u8]) {
    for (i, &width) in widths.iter().enumerate() {
        let width = u32::from(width);
        runs.push(if i % 2 == 0 {
            Run::bar(width)
        } else {
            Run::space(width)
        });
    }
}
