//! Validated render configuration and the resolver that builds it.
//!
//! Every numeric field is clamped here, so encoders and the renderer can
//! rely on in-range values without re-checking them.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::options::keys;
use crate::config::{ConfigError, RenderOptions};

/// Smallest module width in pixels.
pub const MIN_SCALE: u32 = 1;
/// Largest module width in pixels.
pub const MAX_SCALE: u32 = 4;
/// Shortest bar height in modules.
pub const MIN_THICKNESS: u32 = 9;
/// Tallest bar height in modules.
pub const MAX_THICKNESS: u32 = 90;
/// Lowest DPI written to image metadata.
pub const MIN_DPI: u32 = 72;
/// Highest DPI written to image metadata.
pub const MAX_DPI: u32 = 300;

pub const DEFAULT_SCALE: u32 = 1;
pub const DEFAULT_THICKNESS: u32 = 30;
pub const DEFAULT_DPI: u32 = 72;
/// Caption size in points when `fontSize` is not given.
pub const DEFAULT_FONT_SIZE: u32 = 8;
/// Largest caption size in points.
pub const MAX_FONT_SIZE: u32 = 96;

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Counter-clockwise rotation applied to the finished symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalise any multiple of 90 degrees (negative allowed).
    pub fn from_degrees(degrees: i64) -> Result<Self, ConfigError> {
        if degrees % 90 != 0 {
            return Err(ConfigError::InvalidRotation(degrees));
        }
        Ok(match degrees.rem_euclid(360) {
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            _ => Rotation::None,
        })
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// A font to load from the font directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    /// File name inside the font directory (e.g. `Arial.ttf`).
    pub family: String,
    /// Size in points, in `[1, 96]`.
    pub size: u32,
}

/// A complete Intelligent Mail tracking code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackingCode {
    pub barcode_identifier: u64,
    pub service_type: u64,
    pub mailer_identifier: u64,
    pub serial_number: u64,
}

/// Tracking-code fields as supplied; any of them may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackingFields {
    pub barcode_identifier: Option<u64>,
    pub service_type: Option<u64>,
    pub mailer_identifier: Option<u64>,
    pub serial_number: Option<u64>,
}

impl TrackingFields {
    /// The tracking code, only if all four fields were supplied.
    pub fn complete(&self) -> Option<TrackingCode> {
        Some(TrackingCode {
            barcode_identifier: self.barcode_identifier?,
            service_type: self.service_type?,
            mailer_identifier: self.mailer_identifier?,
            serial_number: self.serial_number?,
        })
    }

    /// Number of fields supplied.
    pub fn supplied(&self) -> usize {
        [
            self.barcode_identifier,
            self.service_type,
            self.mailer_identifier,
            self.serial_number,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}

/// Validated, clamped attribute set for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Module width in pixels, in `[1, 4]`.
    pub scale: u32,
    /// Metadata DPI in `[72, 300]`, or unset.
    pub dpi: Option<u32>,
    pub rotation: Rotation,
    /// Bar height in modules, in `[9, 90]`.
    pub thickness: u32,
    /// Caption font; `None` renders bars without text.
    pub font: Option<FontSpec>,
    pub foreground: Color,
    pub background: Color,
    /// Start character override for sequential symbologies.
    pub start: Option<String>,
    pub checksum: bool,
    pub tracking: TrackingFields,
    pub label: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            dpi: Some(DEFAULT_DPI),
            rotation: Rotation::None,
            thickness: DEFAULT_THICKNESS,
            font: None,
            foreground: Color::BLACK,
            background: Color::WHITE,
            start: None,
            checksum: false,
            tracking: TrackingFields::default(),
            label: None,
        }
    }
}

fn font_family_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A bare file name: no separators, no leading dot.
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("Invalid regex pattern"))
}

/// Resolve an options bag into a [`RenderConfig`].
///
/// Unknown keys are ignored. Numeric fields are clamped into range;
/// unparseable values are rejected.
///
/// # Example
///
/// ```
/// use barcodegen::config::{resolve, RenderOptions};
///
/// let options = RenderOptions::new()
///     .with("scale", "10")
///     .with("thickness", "1")
///     .with("dpi", "400");
/// let config = resolve(&options).unwrap();
///
/// assert_eq!(config.scale, 4);
/// assert_eq!(config.thickness, 9);
/// assert_eq!(config.dpi, Some(300));
/// ```
pub fn resolve(options: &RenderOptions) -> Result<RenderConfig, ConfigError> {
    let defaults = RenderConfig::default();

    let scale = match integer(options, keys::SCALE)? {
        Some(value) => clamp(value, MIN_SCALE, MAX_SCALE),
        None => defaults.scale,
    };

    let thickness = match integer(options, keys::THICKNESS)? {
        Some(value) => clamp(value, MIN_THICKNESS, MAX_THICKNESS),
        None => defaults.thickness,
    };

    // Absent means the default; present but empty explicitly unsets it.
    let dpi = match options.get(keys::DPI) {
        None => defaults.dpi,
        Some(raw) if raw.trim().is_empty() => None,
        Some(_) => integer(options, keys::DPI)?.map(|value| clamp(value, MIN_DPI, MAX_DPI)),
    };

    let rotation = match integer(options, keys::ROTATION)? {
        Some(degrees) => Rotation::from_degrees(degrees)?,
        None => defaults.rotation,
    };

    let font = resolve_font(options)?;

    let foreground = color(options, keys::FOREGROUND_COLOR)?.unwrap_or(defaults.foreground);
    let background = color(options, keys::BACKGROUND_COLOR)?.unwrap_or(defaults.background);

    let start = options
        .get(keys::START)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let checksum = boolean(options, keys::CHECKSUM)?.unwrap_or(defaults.checksum);

    let tracking = TrackingFields {
        barcode_identifier: tracking_field(options, keys::BARCODE_IDENTIFIER),
        service_type: tracking_field(options, keys::SERVICE_TYPE),
        mailer_identifier: tracking_field(options, keys::MAILER_IDENTIFIER),
        serial_number: tracking_field(options, keys::SERIAL_NUMBER),
    };

    let label = options.get(keys::LABEL).map(str::to_string);

    Ok(RenderConfig {
        scale,
        dpi,
        rotation,
        thickness,
        font,
        foreground,
        background,
        start,
        checksum,
        tracking,
        label,
    })
}

fn resolve_font(options: &RenderOptions) -> Result<Option<FontSpec>, ConfigError> {
    let Some(family) = options.get(keys::FONT_FAMILY).map(str::trim) else {
        return Ok(None);
    };
    let size = integer(options, keys::FONT_SIZE)?.unwrap_or(i64::from(DEFAULT_FONT_SIZE));

    if family.eq_ignore_ascii_case("none") || family == "0" || size < 1 {
        return Ok(None);
    }
    if !font_family_pattern().is_match(family) {
        return Err(ConfigError::InvalidFontFamily(family.to_string()));
    }

    Ok(Some(FontSpec {
        family: family.to_string(),
        size: clamp(size, 1, MAX_FONT_SIZE),
    }))
}

fn clamp(value: i64, min: u32, max: u32) -> u32 {
    // Bounded by a u32 range, so the narrowing cannot truncate.
    value.clamp(i64::from(min), i64::from(max)) as u32
}

/// Leading integer of `raw`: optional sign, then digits. Trailing text is
/// dropped (`"30.5"` is 30) and magnitudes beyond `u64` saturate.
fn leading_integer(raw: &str) -> Option<(bool, u64)> {
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude = rest[..end].bytes().fold(0u64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
    });
    Some((negative, magnitude))
}

/// Integer option, saturating to the `i64` range.
fn integer(options: &RenderOptions, key: &str) -> Result<Option<i64>, ConfigError> {
    let Some(raw) = options.get(key).map(str::trim) else {
        return Ok(None);
    };
    let (negative, magnitude) = leading_integer(raw).ok_or_else(|| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: raw.to_string(),
    })?;
    let signed = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    // Clamped into the i64 range first, so the narrowing cannot truncate.
    Ok(Some(signed.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64))
}

/// Tracking-code field. Never fails: only the tracking encoder reads these,
/// and it validates the complete code itself.
///
/// A present value without digits (including an empty one) is 0. Negative
/// values saturate to `u64::MAX` so the encoder rejects them as out of range.
fn tracking_field(options: &RenderOptions, key: &str) -> Option<u64> {
    let raw = options.get(key)?.trim();
    Some(match leading_integer(raw) {
        None => 0,
        Some((true, 0)) => 0,
        Some((true, _)) => u64::MAX,
        Some((false, magnitude)) => magnitude,
    })
}

fn boolean(options: &RenderOptions, key: &str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = options.get(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "" | "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn color(options: &RenderOptions, key: &str) -> Result<Option<Color>, ConfigError> {
    match options.get(key) {
        None => Ok(None),
        Some(raw) => Color::from_hex(raw)
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidColor {
                key: key.to_string(),
                value: raw.to_string(),
            }),
    }
}
