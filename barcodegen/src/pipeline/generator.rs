//! The render orchestrator.

use std::sync::{Arc, OnceLock};

use tracing::{debug, instrument, warn};

use crate::config::{convert_text, resolve, RenderOptions};
use crate::error::BarcodeResult;
use crate::font::{default_font_directory, FontLibrary};
use crate::pipeline::{BarcodeRequest, RenderStage};
use crate::render::{
    draw_placeholder, encode_image, error_image_png, rasterize, rotate, OutputFormat,
    RenderedImage,
};
use crate::symbology::{configure_encoder, EncoderRegistry};

/// Drives a request through select, configure, encode, rasterise and emit.
///
/// The registry and font library are shared read-only through `Arc`, so a
/// generator is cheap to clone and safe to use from many threads. Each
/// render creates its own encoder and raster.
///
/// # Example
///
/// ```
/// use barcodegen::pipeline::{BarcodeGenerator, BarcodeRequest};
/// use barcodegen::render::OutputFormat;
///
/// let generator = BarcodeGenerator::default();
/// let request = BarcodeRequest::new("code128", "*123456789012345*", OutputFormat::Png)
///     .with_option("scale", "2")
///     .with_option("thickness", "30");
///
/// let image = generator.render(&request).unwrap();
/// assert_eq!(image.content_type(), "image/png");
/// assert!(!image.is_placeholder());
/// ```
#[derive(Debug, Clone)]
pub struct BarcodeGenerator {
    registry: Arc<EncoderRegistry>,
    fonts: Arc<FontLibrary>,
    defaults: RenderOptions,
}

impl BarcodeGenerator {
    pub fn new(registry: EncoderRegistry, fonts: FontLibrary) -> Self {
        Self::with_shared(Arc::new(registry), Arc::new(fonts))
    }

    /// Build from already shared resources.
    pub fn with_shared(registry: Arc<EncoderRegistry>, fonts: Arc<FontLibrary>) -> Self {
        Self {
            registry,
            fonts,
            defaults: RenderOptions::new(),
        }
    }

    /// Options applied under every request's own options.
    pub fn with_defaults(mut self, defaults: RenderOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn defaults(&self) -> &RenderOptions {
        &self.defaults
    }

    /// Render one request.
    ///
    /// Text the symbology cannot encode does not fail the render: the
    /// result is a placeholder image in the requested format, flagged by
    /// [`RenderedImage::is_placeholder`].
    ///
    /// # Errors
    ///
    /// - [`BarcodeError::InvalidSymbology`](crate::BarcodeError::InvalidSymbology)
    ///   or [`BarcodeError::EncoderNotFound`](crate::BarcodeError::EncoderNotFound)
    ///   before anything else is touched
    /// - [`BarcodeError::Config`](crate::BarcodeError::Config) for malformed options
    /// - [`BarcodeError::FontLoad`](crate::BarcodeError::FontLoad) if the font
    ///   cannot be loaded
    /// - [`BarcodeError::Output`](crate::BarcodeError::Output) if the image
    ///   cannot be serialised
    #[instrument(
        level = "debug",
        skip_all,
        fields(symbology = %request.symbology(), format = %request.format())
    )]
    pub fn render(&self, request: &BarcodeRequest) -> BarcodeResult<RenderedImage> {
        debug!(stage = %RenderStage::Configuring);
        let factory = self.registry.select(request.symbology())?;
        let config = resolve(&request.options().over(&self.defaults))?;
        let font = config
            .font
            .as_ref()
            .map(|spec| self.fonts.load(spec))
            .transpose()?;

        let mut encoder = factory();
        configure_encoder(encoder.as_mut(), &config, font.clone())?;

        debug!(stage = %RenderStage::Encoding, encoder = encoder.name());
        let outcome = if request.text().is_empty() {
            debug!("no text to encode");
            Ok(encoder.blank())
        } else {
            encoder.parse(&convert_text(request.text()))
        };

        let (raster, dpi, faulted) = match outcome {
            Ok(symbol) => {
                debug!(stage = %RenderStage::Rendering, runs = symbol.runs().len());
                (rotate(rasterize(&symbol), config.rotation), config.dpi, false)
            }
            Err(error) => {
                warn!(
                    stage = %RenderStage::Faulted,
                    error = %error,
                    "encoding failed, rendering placeholder"
                );
                let placeholder =
                    draw_placeholder(&error.to_string(), font.as_ref(), config.background);
                (placeholder, None, true)
            }
        };

        debug!(
            stage = %RenderStage::Emitting,
            width = raster.width(),
            height = raster.height()
        );
        let bytes = encode_image(&raster, request.format(), dpi)?;
        let image = RenderedImage::new(bytes, request.format());
        Ok(if faulted { image.as_placeholder() } else { image })
    }

    /// Like [`render`](Self::render), but answers selection failures with
    /// the generic error PNG instead of an error.
    pub fn render_or_error_image(&self, request: &BarcodeRequest) -> BarcodeResult<RenderedImage> {
        match self.render(request) {
            Err(error) if error.is_selection_error() => {
                warn!(error = %error, "serving generic error image");
                Ok(RenderedImage::new(error_image_png().to_vec(), OutputFormat::Png).as_placeholder())
            }
            result => result,
        }
    }
}

impl Default for BarcodeGenerator {
    /// Every built-in symbology, fonts from [`default_font_directory`].
    fn default() -> Self {
        Self::new(
            EncoderRegistry::with_defaults(),
            FontLibrary::new(default_font_directory()),
        )
    }
}

/// Process-wide generator behind [`render`].
fn shared_generator() -> &'static BarcodeGenerator {
    static GENERATOR: OnceLock<BarcodeGenerator> = OnceLock::new();
    GENERATOR.get_or_init(BarcodeGenerator::default)
}

/// Render with the process-wide default generator.
///
/// `format` is `PNG`, `JPEG` (or `JPG`) or `GIF`, in any case.
///
/// # Example
///
/// ```
/// use barcodegen::config::RenderOptions;
///
/// let options = RenderOptions::new().with("scale", "2");
/// let image = barcodegen::render("code39", "HELLO", "gif", &options).unwrap();
/// assert_eq!(image.content_type(), "image/gif");
/// ```
pub fn render(
    symbology: &str,
    text: &str,
    format: &str,
    options: &RenderOptions,
) -> BarcodeResult<RenderedImage> {
    let format: OutputFormat = format.parse()?;
    let request = BarcodeRequest::new(symbology, text, format).with_options(options.clone());
    shared_generator().render(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::BarcodeError;

    fn generator() -> BarcodeGenerator {
        BarcodeGenerator::new(EncoderRegistry::with_defaults(), FontLibrary::new("/nonexistent"))
    }

    #[test]
    fn test_render_png() {
        let request = BarcodeRequest::new("code128", "ABC123", OutputFormat::Png);
        let image = generator().render(&request).unwrap();
        assert_eq!(image.format(), OutputFormat::Png);
        assert!(!image.is_placeholder());
        assert_eq!(&image.bytes()[..4], b"\x89PNG");
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let request = BarcodeRequest::new("code128", "ABC", OutputFormat::Png)
            .with_option("rotation", "45");
        let err = generator().render(&request).unwrap_err();
        assert!(matches!(
            err,
            BarcodeError::Config(ConfigError::InvalidRotation(45))
        ));
    }

    #[test]
    fn test_missing_font_is_fatal() {
        let request = BarcodeRequest::new("code128", "ABC", OutputFormat::Png)
            .with_option("fontFamily", "Arial.ttf");
        let err = generator().render(&request).unwrap_err();
        assert!(matches!(err, BarcodeError::FontLoad(_)));
    }

    #[test]
    fn test_generator_defaults_layered_under_request() {
        let generator = generator().with_defaults(RenderOptions::new().with("rotation", "45"));
        let request = BarcodeRequest::new("code128", "ABC", OutputFormat::Png)
            .with_option("rotation", "90");
        assert!(generator.render(&request).is_ok());

        let request = BarcodeRequest::new("code128", "ABC", OutputFormat::Png);
        assert!(generator.render(&request).is_err());
    }

    #[test]
    fn test_encode_failure_becomes_placeholder() {
        let request = BarcodeRequest::new("code39", "lower", OutputFormat::Gif);
        let image = generator().render(&request).unwrap();
        assert!(image.is_placeholder());
        assert_eq!(image.content_type(), "image/gif");
    }

    #[test]
    fn test_render_or_error_image() {
        let request = BarcodeRequest::new("nosuchcode", "1", OutputFormat::Jpeg);
        let image = generator().render_or_error_image(&request).unwrap();
        assert!(image.is_placeholder());
        assert_eq!(image.format(), OutputFormat::Png);
        assert_eq!(image.bytes(), error_image_png());
    }

    #[test]
    fn test_free_render_function() {
        let image = render("i25", "1234", "PNG", &RenderOptions::new()).unwrap();
        assert_eq!(image.content_type(), "image/png");

        let err = render("i25", "1234", "bmp", &RenderOptions::new()).unwrap_err();
        assert!(matches!(err, BarcodeError::UnsupportedFormat(_)));
    }
}
