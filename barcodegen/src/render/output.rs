//! Output formats and raster-to-bytes encoding.

use std::fmt;
use std::str::FromStr;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ExtendedColorType, RgbImage};
use thiserror::Error;

use crate::error::BarcodeError;

/// JPEG quality used for every render, so output is reproducible.
const JPEG_QUALITY: u8 = 90;

const METERS_PER_INCH: f64 = 0.0254;

/// Errors while serialising a raster.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// The three supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Gif];

    /// MIME type sent alongside the bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Gif => "gif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Gif => "GIF",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = BarcodeError;

    /// Case-insensitive; `JPG` is accepted for JPEG.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(OutputFormat::Png),
            "JPEG" | "JPG" => Ok(OutputFormat::Jpeg),
            "GIF" => Ok(OutputFormat::Gif),
            _ => Err(BarcodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Serialise `image` in `format`, recording `dpi` where the format allows.
///
/// GIF has no density field, so `dpi` is ignored there.
pub fn encode_image(
    image: &RgbImage,
    format: OutputFormat,
    dpi: Option<u32>,
) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => encode_png(image, dpi, &mut bytes)?,
        OutputFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            if let Some(dpi) = dpi {
                let dpi = u16::try_from(dpi).unwrap_or(u16::MAX);
                encoder.set_pixel_density(PixelDensity::dpi(dpi));
            }
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}

/// PNG through the `png` crate directly, for the `pHYs` chunk.
fn encode_png(image: &RgbImage, dpi: Option<u32>, out: &mut Vec<u8>) -> Result<(), OutputError> {
    let mut encoder = png::Encoder::new(out, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    if let Some(dpi) = dpi {
        let per_meter = (f64::from(dpi) / METERS_PER_INCH).round() as u32;
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: per_meter,
            yppu: per_meter,
            unit: png::Unit::Meter,
        }));
    }
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()?;
    Ok(())
}

/// Final output of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    bytes: Vec<u8>,
    format: OutputFormat,
    placeholder: bool,
}

impl RenderedImage {
    pub fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            bytes,
            format,
            placeholder: false,
        }
    }

    /// Mark the image as a diagnostic placeholder rather than a barcode.
    pub fn as_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// True when the image reports an error instead of showing a barcode.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    fn sample() -> RgbImage {
        RgbImage::from_fn(20, 10, |x, _| {
            if x % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("Jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("gif".parse::<OutputFormat>().unwrap(), OutputFormat::Gif);
        assert!(matches!(
            "BMP".parse::<OutputFormat>(),
            Err(BarcodeError::UnsupportedFormat(ref f)) if f == "BMP"
        ));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(OutputFormat::Png.content_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(OutputFormat::Gif.content_type(), "image/gif");
        assert_eq!(OutputFormat::Jpeg.to_string(), "JPEG");
    }

    #[test]
    fn test_every_format_decodes() {
        let image = sample();
        for (format, decoder) in [
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Jpeg, ImageFormat::Jpeg),
            (OutputFormat::Gif, ImageFormat::Gif),
        ] {
            let bytes = encode_image(&image, format, Some(150)).unwrap();
            let decoded = image::load_from_memory_with_format(&bytes, decoder).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (20, 10), "{format}");
        }
    }

    #[test]
    fn test_png_physical_dimensions() {
        let bytes = encode_image(&sample(), OutputFormat::Png, Some(300)).unwrap();
        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!(dims.unit, png::Unit::Meter);
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
    }

    #[test]
    fn test_png_without_dpi_has_no_physical_dimensions() {
        let bytes = encode_image(&sample(), OutputFormat::Png, None).unwrap();
        let reader = png::Decoder::new(bytes.as_slice()).read_info().unwrap();
        assert!(reader.info().pixel_dims.is_none());
    }

    #[test]
    fn test_jpeg_density() {
        let bytes = encode_image(&sample(), OutputFormat::Jpeg, Some(200)).unwrap();
        // JFIF APP0: units byte 1 (dpi), then big-endian x and y density
        let app0 = bytes
            .windows(5)
            .position(|w| w == b"JFIF\0")
            .unwrap();
        let density = &bytes[app0 + 7..app0 + 12];
        assert_eq!(density, &[1, 0, 200, 0, 200]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let image = sample();
        for format in OutputFormat::ALL {
            assert_eq!(
                encode_image(&image, format, Some(72)).unwrap(),
                encode_image(&image, format, Some(72)).unwrap()
            );
        }
    }

    #[test]
    fn test_rendered_image() {
        let image = RenderedImage::new(vec![1, 2, 3], OutputFormat::Gif);
        assert_eq!(image.content_type(), "image/gif");
        assert!(!image.is_placeholder());
        assert!(image.clone().as_placeholder().is_placeholder());
        assert_eq!(image.into_bytes(), vec![1, 2, 3]);
    }
}
