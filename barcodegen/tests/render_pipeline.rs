//! End-to-end tests for the render pipeline.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use barcodegen::config::{Latin1Text, RenderOptions};
use barcodegen::font::FontLibrary;
use barcodegen::render::error_image_png;
use barcodegen::symbology::{
    BarcodeEncoder, EncodeError, EncodedSymbol, EncoderRegistry, Run, SymbolStyle,
};
use barcodegen::{BarcodeError, BarcodeGenerator, BarcodeRequest, OutputFormat};
use image::ImageFormat;

const FIXTURE_FONT: &str = "DejaVuSansMono.ttf";

fn fixture_fonts() -> FontLibrary {
    FontLibrary::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts"))
}

fn font_generator() -> BarcodeGenerator {
    BarcodeGenerator::new(EncoderRegistry::with_defaults(), fixture_fonts())
}

fn generator() -> BarcodeGenerator {
    let fonts = tempfile::tempdir().unwrap();
    BarcodeGenerator::new(EncoderRegistry::with_defaults(), FontLibrary::new(fonts.path()))
}

fn image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Gif => ImageFormat::Gif,
    }
}

fn decode(bytes: &[u8], format: OutputFormat) -> image::DynamicImage {
    image::load_from_memory_with_format(bytes, image_format(format)).unwrap()
}

/// Counts calls to `parse` and draws a single bar.
struct CountingEncoder {
    style: SymbolStyle,
    parses: Arc<AtomicUsize>,
}

impl BarcodeEncoder for CountingEncoder {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn style(&self) -> &SymbolStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut SymbolStyle {
        &mut self.style
    }

    fn parse(&self, _text: &Latin1Text) -> Result<EncodedSymbol, EncodeError> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        Ok(EncodedSymbol::new(self.style.clone(), vec![Run::bar(1)]))
    }
}

fn counting_generator() -> (BarcodeGenerator, Arc<AtomicUsize>) {
    let parses = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&parses);
    let mut registry = EncoderRegistry::new();
    registry
        .register("counting", move || {
            Box::new(CountingEncoder {
                style: SymbolStyle::default(),
                parses: Arc::clone(&counter),
            }) as Box<dyn BarcodeEncoder>
        })
        .unwrap();
    let generator = BarcodeGenerator::new(registry, FontLibrary::new("/nonexistent"));
    (generator, parses)
}

#[test]
fn test_code128_png_end_to_end() {
    let request = BarcodeRequest::new("code128", "*123456789012345*", OutputFormat::Png)
        .with_option("scale", "2")
        .with_option("thickness", "30");

    let image = generator().render(&request).unwrap();
    assert_eq!(image.content_type(), "image/png");
    assert!(!image.is_placeholder());

    let decoded = decode(image.bytes(), OutputFormat::Png);
    assert_eq!(decoded.height(), 60);
    assert!(decoded.width() > 40);
}

#[test]
fn test_legacy_query_end_to_end() {
    let request = BarcodeRequest::from_query(
        "filetype=GIF&dpi=72&scale=2&rotation=90&text=*123%20ABC*&thickness=30&code=BCGcode128",
    )
    .unwrap();
    let image = generator().render(&request).unwrap();
    assert_eq!(image.content_type(), "image/gif");

    let decoded = decode(image.bytes(), OutputFormat::Gif);
    // Rotated a quarter turn: bars run horizontally.
    assert_eq!(decoded.width(), 60);
    assert!(decoded.height() > decoded.width());
}

#[test]
fn test_malformed_identifier_rejected_before_font_load() {
    let request = BarcodeRequest::new("DROP TABLE", "x", OutputFormat::Png)
        .with_option("fontFamily", "Missing.ttf");
    let generator = generator();

    let err = generator.render(&request).unwrap_err();
    assert!(matches!(err, BarcodeError::InvalidSymbology(ref id) if id == "DROP TABLE"));
    assert_eq!(generator.fonts().cached_faces(), 0);
}

#[test]
fn test_path_like_identifiers_rejected() {
    for id in ["../etc/passwd", "code-128", "", "code 128"] {
        let request = BarcodeRequest::new(id, "123", OutputFormat::Png);
        let err = generator().render(&request).unwrap_err();
        assert!(
            matches!(err, BarcodeError::InvalidSymbology(_)),
            "{id:?} gave {err:?}"
        );
    }
}

#[test]
fn test_unknown_identifier() {
    let request = BarcodeRequest::new("qrcode", "123", OutputFormat::Png);
    let err = generator().render(&request).unwrap_err();
    assert!(matches!(err, BarcodeError::EncoderNotFound(_)));
}

#[test]
fn test_legacy_alias_selects_same_encoder() {
    let canonical = BarcodeRequest::new("code39", "ABC", OutputFormat::Png);
    let legacy = BarcodeRequest::new("BCGcode39", "ABC", OutputFormat::Png);
    let generator = generator();
    assert_eq!(
        generator.render(&canonical).unwrap().bytes(),
        generator.render(&legacy).unwrap().bytes()
    );
}

#[test]
fn test_empty_text_skips_parse() {
    let (generator, parses) = counting_generator();

    let image = generator
        .render(&BarcodeRequest::new("counting", "", OutputFormat::Png))
        .unwrap();
    assert!(!image.is_placeholder());
    assert_eq!(parses.load(Ordering::SeqCst), 0);

    generator
        .render(&BarcodeRequest::new("counting", "1", OutputFormat::Png))
        .unwrap();
    assert_eq!(parses.load(Ordering::SeqCst), 1);
}

#[test]
fn test_text_empty_only_after_unescaping_is_parsed() {
    let (generator, parses) = counting_generator();

    generator
        .render(&BarcodeRequest::new("counting", "\\", OutputFormat::Png))
        .unwrap();
    assert_eq!(parses.load(Ordering::SeqCst), 1);
}

#[test]
fn test_encode_error_keeps_requested_format() {
    for format in OutputFormat::ALL {
        let request = BarcodeRequest::new("i25", "12A4", format).with_option("checksum", "1");
        let image = generator().render(&request).unwrap();

        assert!(image.is_placeholder());
        assert_eq!(image.format(), format);
        decode(image.bytes(), format);
    }
}

#[test]
fn test_placeholder_ignores_rotation() {
    let request = BarcodeRequest::new("msi", "not digits", OutputFormat::Png)
        .with_option("rotation", "90");
    let image = generator().render(&request).unwrap();
    assert!(image.is_placeholder());

    let decoded = decode(image.bytes(), OutputFormat::Png);
    assert!(decoded.width() > decoded.height());
}

#[test]
fn test_intelligent_mail_with_tracking_code() {
    let request = BarcodeRequest::new("intelligentmail", "01234567891", OutputFormat::Png)
        .with_option("barcodeIdentifier", "01")
        .with_option("serviceType", "234")
        .with_option("mailerIdentifier", "567094")
        .with_option("serialNumber", "987654321");
    let image = generator().render(&request).unwrap();
    assert!(!image.is_placeholder());
}

#[test]
fn test_partial_tracking_code_same_as_none() {
    let none = BarcodeRequest::new("intelligentmail", "01234", OutputFormat::Png);
    let partial = none
        .clone()
        .with_option("barcodeIdentifier", "01")
        .with_option("serviceType", "234")
        .with_option("mailerIdentifier", "567094");
    let generator = generator();

    let from_none = generator.render(&none).unwrap();
    let from_partial = generator.render(&partial).unwrap();
    assert!(from_none.is_placeholder());
    assert!(from_partial.is_placeholder());
    assert_eq!(from_none.bytes(), from_partial.bytes());
}

#[test]
fn test_tracking_keys_ignored_by_other_symbologies() {
    let request = BarcodeRequest::new("code128", "ABC", OutputFormat::Png)
        .with_option("serialNumber", "abc")
        .with_option("serviceType", "-5");
    let image = generator().render(&request).unwrap();
    assert!(!image.is_placeholder());
}

#[test]
fn test_negative_tracking_field_rejected_by_intelligent_mail() {
    let request = BarcodeRequest::new("intelligentmail", "01234", OutputFormat::Png)
        .with_option("barcodeIdentifier", "01")
        .with_option("serviceType", "-5")
        .with_option("mailerIdentifier", "567094")
        .with_option("serialNumber", "987654321");
    let err = generator().render(&request).unwrap_err();
    assert!(matches!(err, BarcodeError::Config(_)));
}

#[test]
fn test_oversized_numbers_clamped_end_to_end() {
    let request = BarcodeRequest::new("code128", "ABC", OutputFormat::Png)
        .with_option("scale", "99999999999999999999")
        .with_option("thickness", "30.5");
    let image = generator().render(&request).unwrap();

    let decoded = decode(image.bytes(), OutputFormat::Png);
    assert_eq!(decoded.height(), 30 * 4);
}

#[test]
fn test_caption_drawn_below_bars() {
    let generator = font_generator();
    let plain = BarcodeRequest::new("code128", "12345", OutputFormat::Png);
    let captioned = plain
        .clone()
        .with_option("fontFamily", FIXTURE_FONT)
        .with_option("fontSize", "10");

    let plain = decode(generator.render(&plain).unwrap().bytes(), OutputFormat::Png).to_rgb8();
    let captioned =
        decode(generator.render(&captioned).unwrap().bytes(), OutputFormat::Png).to_rgb8();

    assert_eq!(plain.height(), 30);
    assert!(captioned.height() > plain.height());
    assert!(captioned.width() >= plain.width());

    let ink_below_bars = captioned
        .enumerate_pixels()
        .filter(|(_, y, pixel)| *y >= 30 && pixel.0.iter().all(|&c| c < 128))
        .count();
    assert!(ink_below_bars > 0);
    assert_eq!(generator.fonts().cached_faces(), 1);
}

#[test]
fn test_font_placeholder_keeps_format_and_shows_message() {
    let generator = font_generator();
    let with_font = BarcodeRequest::new("code39", "lower", OutputFormat::Png)
        .with_option("fontFamily", FIXTURE_FONT);
    let without_font = BarcodeRequest::new("code39", "lower", OutputFormat::Png);

    let with_font_image = generator.render(&with_font).unwrap();
    let without_font_image = generator.render(&without_font).unwrap();
    assert!(with_font_image.is_placeholder());
    assert_ne!(with_font_image.bytes(), without_font_image.bytes());

    let jpeg = BarcodeRequest::new("code39", "lower", OutputFormat::Jpeg)
        .with_option("fontFamily", FIXTURE_FONT)
        .with_option("fontSize", "6");
    let image = generator.render(&jpeg).unwrap();
    assert!(image.is_placeholder());
    assert_eq!(image.content_type(), "image/jpeg");

    let decoded = decode(image.bytes(), OutputFormat::Jpeg);
    assert_eq!((decoded.width(), decoded.height()), (240, 60));
}

#[test]
fn test_repeated_font_use_loads_once() {
    let generator = font_generator();
    for size in ["6", "8", "12"] {
        let request = BarcodeRequest::new("i25", "1234", OutputFormat::Gif)
            .with_option("fontFamily", FIXTURE_FONT)
            .with_option("fontSize", size);
        generator.render(&request).unwrap();
    }
    assert_eq!(generator.fonts().cached_faces(), 1);
}

#[test]
fn test_invalid_tracking_code_is_config_error() {
    let request = BarcodeRequest::new("intelligentmail", "01234", OutputFormat::Png)
        .with_option("barcodeIdentifier", "07")
        .with_option("serviceType", "234")
        .with_option("mailerIdentifier", "567094")
        .with_option("serialNumber", "987654321");
    let err = generator().render(&request).unwrap_err();
    assert!(matches!(err, BarcodeError::Config(_)));
}

#[test]
fn test_invalid_start_is_config_error() {
    let request = BarcodeRequest::new("code128", "123", OutputFormat::Png).with_option("start", "D");
    let err = generator().render(&request).unwrap_err();
    assert!(matches!(err, BarcodeError::Config(_)));
}

#[test]
fn test_idempotent_output() {
    let options = RenderOptions::new()
        .with("scale", "3")
        .with("thickness", "40")
        .with("foregroundColor", "#003366")
        .with("dpi", "150");
    let request =
        BarcodeRequest::new("code39extended", "Hello, World", OutputFormat::Jpeg).with_options(options);
    let generator = generator();

    let first = generator.render(&request).unwrap();
    let second = generator.render(&request).unwrap();
    assert_eq!(first.bytes(), second.bytes());

    let outputs: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                let request = request.clone();
                scope.spawn(move || generator.render(&request).unwrap().into_bytes())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(outputs.iter().all(|bytes| bytes == first.bytes()));
}

#[test]
fn test_dpi_written_to_png() {
    let request = BarcodeRequest::new("s25", "12345", OutputFormat::Png).with_option("dpi", "300");
    let image = generator().render(&request).unwrap();

    let decoder = png::Decoder::new(Cursor::new(image.bytes()));
    let reader = decoder.read_info().unwrap();
    let dims = reader.info().pixel_dims.unwrap();
    assert_eq!(dims.xppu, 11811);
    assert_eq!(dims.unit, png::Unit::Meter);
}

#[test]
fn test_empty_dpi_omits_density() {
    let request = BarcodeRequest::new("s25", "12345", OutputFormat::Png).with_option("dpi", "");
    let image = generator().render(&request).unwrap();

    let decoder = png::Decoder::new(Cursor::new(image.bytes()));
    let reader = decoder.read_info().unwrap();
    assert!(reader.info().pixel_dims.is_none());
}

#[test]
fn test_error_image_fallback() {
    let request = BarcodeRequest::new("../etc/passwd", "1", OutputFormat::Gif);
    let image = generator().render_or_error_image(&request).unwrap();

    assert!(image.is_placeholder());
    assert_eq!(image.content_type(), "image/png");
    assert_eq!(image.bytes(), error_image_png());
    decode(image.bytes(), OutputFormat::Png);
}

#[test]
fn test_error_image_fallback_leaves_other_errors() {
    let request =
        BarcodeRequest::new("code128", "1", OutputFormat::Png).with_option("scale", "big");
    let err = generator().render_or_error_image(&request).unwrap_err();
    assert!(matches!(err, BarcodeError::Config(_)));
}

#[test]
fn test_unsupported_format() {
    let err = barcodegen::render("code128", "1", "tiff", &RenderOptions::new()).unwrap_err();
    assert!(matches!(err, BarcodeError::UnsupportedFormat(_)));
}

#[test]
fn test_every_registered_symbology_renders() {
    let samples = [
        ("code128", "Code 128"),
        ("gs1128", "(01)0950110153000"),
        ("code39", "CODE39"),
        ("code39extended", "code39"),
        ("i25", "123456"),
        ("s25", "12345"),
        ("msi", "1234567"),
        ("othercode", "1213"),
    ];
    let generator = generator();
    for (id, text) in samples {
        let request = BarcodeRequest::new(id, text, OutputFormat::Png);
        let image = generator.render(&request).unwrap();
        assert!(!image.is_placeholder(), "{id} rendered a placeholder");
    }
}
