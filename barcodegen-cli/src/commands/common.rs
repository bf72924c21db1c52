//! Common types and helpers shared across CLI commands.

use std::path::PathBuf;

use barcodegen::config::ConfigFile;
use barcodegen::font::default_font_directory;
use barcodegen::OutputFormat;
use clap::ValueEnum;

/// Output format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Gif,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Gif => OutputFormat::Gif,
        }
    }
}

/// Font directory: CLI flag, then config file, then the library default
/// (`$BARCODEGEN_FONT_DIR`, then `./fonts`).
pub fn resolve_font_directory(cli_dir: Option<PathBuf>, config: &ConfigFile) -> PathBuf {
    cli_dir
        .or_else(|| config.font_directory.clone())
        .unwrap_or_else(default_font_directory)
}

/// Parse a `key=value` pair for `-O`.
pub fn parse_key_value(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{pair}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_conversion() {
        assert_eq!(OutputFormat::from(FormatArg::Jpeg), OutputFormat::Jpeg);
        assert_eq!(FormatArg::from_str("jpg", true), Ok(FormatArg::Jpeg));
    }

    #[test]
    fn test_font_directory_precedence() {
        let config = ConfigFile {
            font_directory: Some(PathBuf::from("/etc/fonts")),
            ..ConfigFile::default()
        };
        assert_eq!(
            resolve_font_directory(Some(PathBuf::from("/cli")), &config),
            PathBuf::from("/cli")
        );
        assert_eq!(
            resolve_font_directory(None, &config),
            PathBuf::from("/etc/fonts")
        );
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("scale=2"),
            Ok(("scale".to_string(), "2".to_string()))
        );
        assert_eq!(
            parse_key_value("label=a=b"),
            Ok(("label".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_key_value("dpi="),
            Ok(("dpi".to_string(), String::new()))
        );
        assert!(parse_key_value("scale").is_err());
        assert!(parse_key_value("=2").is_err());
    }
}
