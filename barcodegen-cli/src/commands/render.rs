//! Render command - encode text and write the image.

use std::io::Write;
use std::path::{Path, PathBuf};

use barcodegen::config::{keys, ConfigFile, RenderOptions};
use barcodegen::font::FontLibrary;
use barcodegen::pipeline::DEFAULT_SYMBOLOGY;
use barcodegen::symbology::EncoderRegistry;
use barcodegen::{BarcodeGenerator, BarcodeRequest, OutputFormat, RenderedImage};
use clap::Args;
use tracing::{info, warn};

use super::common::{parse_key_value, resolve_font_directory, FormatArg};
use crate::error::CliError;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Symbology identifier, e.g. code128 (see `barcodegen list`)
    pub symbology: Option<String>,

    /// Text to encode
    pub text: Option<String>,

    /// Output image format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output file (stdout when absent)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pixels per module (1-4)
    #[arg(long)]
    pub scale: Option<u32>,

    /// Resolution stored in the image (72-300); empty to omit
    #[arg(long)]
    pub dpi: Option<String>,

    /// Counter-clockwise rotation in degrees, a multiple of 90
    #[arg(long, allow_hyphen_values = true)]
    pub rotation: Option<i64>,

    /// Bar height in modules (9-90)
    #[arg(long)]
    pub thickness: Option<u32>,

    /// Caption font file inside the font directory
    #[arg(long)]
    pub font_family: Option<String>,

    /// Caption font size in points
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Initial code set for Code 128 (A, B or C)
    #[arg(long)]
    pub start: Option<String>,

    /// Append the optional check character
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub checksum: Option<bool>,

    /// Intelligent Mail barcode identifier
    #[arg(long)]
    pub barcode_identifier: Option<u64>,

    /// Intelligent Mail service type
    #[arg(long)]
    pub service_type: Option<u64>,

    /// Intelligent Mail mailer identifier
    #[arg(long)]
    pub mailer_identifier: Option<u64>,

    /// Intelligent Mail serial number
    #[arg(long)]
    pub serial_number: Option<u64>,

    /// Caption label for othercode
    #[arg(long)]
    pub label: Option<String>,

    /// Bar colour as RRGGBB
    #[arg(long)]
    pub foreground: Option<String>,

    /// Background colour as RRGGBB
    #[arg(long)]
    pub background: Option<String>,

    /// Raw option, repeatable
    #[arg(short = 'O', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Legacy query string, e.g. "code=BCGcode39&text=ABC&scale=2"
    #[arg(long)]
    pub query: Option<String>,

    /// Configuration file (default: <config dir>/barcodegen/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Font directory
    #[arg(long)]
    pub font_dir: Option<PathBuf>,

    /// Emit the generic error PNG instead of failing on an unknown symbology
    #[arg(long)]
    pub fallback_image: bool,
}

/// Run the render command.
pub fn run(args: RenderArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    let font_dir = resolve_font_directory(args.font_dir.clone(), &config);
    info!(font_dir = %font_dir.display(), "using font directory");

    let generator = BarcodeGenerator::new(EncoderRegistry::with_defaults(), FontLibrary::new(font_dir))
        .with_defaults(config.defaults);

    let fallback = args.fallback_image;
    let output = args.output.clone();
    let request = build_request(args)?;

    let image = if fallback {
        generator.render_or_error_image(&request)?
    } else {
        generator.render(&request)?
    };

    if image.is_placeholder() {
        warn!("text could not be encoded, wrote a placeholder image");
    }
    eprintln!("{}", image.content_type());
    write_image(&image, output.as_deref())
}

/// Layer the request sources: query string, then `-O` pairs, then typed
/// flags. Positional arguments and `--format` override the query.
fn build_request(args: RenderArgs) -> Result<BarcodeRequest, CliError> {
    let base = match &args.query {
        Some(query) => BarcodeRequest::from_query(query)?,
        None => BarcodeRequest::new(DEFAULT_SYMBOLOGY, "", OutputFormat::default()),
    };

    let symbology = args
        .symbology
        .unwrap_or_else(|| base.symbology().to_string());
    if symbology.is_empty() {
        return Err(CliError::Usage("symbology must not be empty".to_string()));
    }
    let text = args.text.unwrap_or_else(|| base.text().to_string());
    let format = args.format.map(OutputFormat::from).unwrap_or(base.format());

    let mut options: RenderOptions = base.options().clone();
    for (key, value) in args.options {
        options.insert(key, value);
    }

    let typed = [
        (keys::SCALE, args.scale.map(|v| v.to_string())),
        (keys::DPI, args.dpi),
        (keys::ROTATION, args.rotation.map(|v| v.to_string())),
        (keys::THICKNESS, args.thickness.map(|v| v.to_string())),
        (keys::FONT_FAMILY, args.font_family),
        (keys::FONT_SIZE, args.font_size.map(|v| v.to_string())),
        (keys::START, args.start),
        (keys::CHECKSUM, args.checksum.map(|v| v.to_string())),
        (keys::BARCODE_IDENTIFIER, args.barcode_identifier.map(|v| v.to_string())),
        (keys::SERVICE_TYPE, args.service_type.map(|v| v.to_string())),
        (keys::MAILER_IDENTIFIER, args.mailer_identifier.map(|v| v.to_string())),
        (keys::SERIAL_NUMBER, args.serial_number.map(|v| v.to_string())),
        (keys::LABEL, args.label),
        (keys::FOREGROUND_COLOR, args.foreground),
        (keys::BACKGROUND_COLOR, args.background),
    ];
    for (key, value) in typed {
        if let Some(value) = value {
            options.insert(key, value);
        }
    }

    Ok(BarcodeRequest::new(symbology, text, format).with_options(options))
}

fn write_image(image: &RenderedImage, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, image.bytes()).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(image.bytes())
                .and_then(|()| stdout.flush())
                .map_err(CliError::Stdout)
        }
    }
}
