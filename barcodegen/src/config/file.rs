//! Process-level configuration file.
//!
//! ```ini
//! [fonts]
//! directory = /usr/share/barcodegen/fonts
//!
//! [defaults]
//! scale = 2
//! thickness = 40
//! fontFamily = Arial.ttf
//! ```
//!
//! `[defaults]` values are layered *under* per-request options.

use std::path::{Path, PathBuf};

use ini::Ini;

use crate::config::{ConfigError, RenderOptions};

const FONTS_SECTION: &str = "fonts";
const DEFAULTS_SECTION: &str = "defaults";
const DIRECTORY_KEY: &str = "directory";

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Font resource directory, if configured.
    pub font_directory: Option<PathBuf>,
    /// Option defaults applied to every request.
    pub defaults: RenderOptions,
}

/// Default location: `<config_dir>/barcodegen/config.ini`.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("barcodegen").join("config.ini"))
}

impl ConfigFile {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_ini(&ini))
    }

    /// Parse configuration from INI text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::File {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let font_directory = ini
            .section(Some(FONTS_SECTION))
            .and_then(|section| section.get(DIRECTORY_KEY))
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let defaults = ini
            .section(Some(DEFAULTS_SECTION))
            .map(|section| section.iter().collect())
            .unwrap_or_default();

        Self {
            font_directory,
            defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_sections() {
        let config = ConfigFile::parse(
            "[fonts]\ndirectory = /opt/fonts\n\n[defaults]\nscale = 2\nfont_family = Arial.ttf\n",
        )
        .unwrap();
        assert_eq!(config.font_directory, Some(PathBuf::from("/opt/fonts")));
        assert_eq!(config.defaults.get("scale"), Some("2"));
        assert_eq!(config.defaults.get("fontFamily"), Some("Arial.ttf"));
    }

    #[test]
    fn test_parse_empty() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]").unwrap();
        writeln!(file, "thickness = 50").unwrap();

        let config = ConfigFile::load_from(file.path()).unwrap();
        assert_eq!(config.defaults.get("thickness"), Some("50"));
        assert!(config.font_directory.is_none());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load_from(&dir.path().join("absent.ini"));
        assert!(matches!(result, Err(ConfigError::File { .. })));
    }
}
