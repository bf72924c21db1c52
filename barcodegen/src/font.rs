//! Font resource loading for captions.
//!
//! Fonts are TrueType/OpenType files in a single font directory, addressed
//! by bare file name. Validated font files are cached per file name and shared
//! across requests. The point size is applied per request, so the cache is
//! read-only once a face is loaded.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use ttf_parser::Face;
use thiserror::Error;

use crate::config::FontSpec;

/// Pixels per point; captions are laid out at 96 pixels per inch.
const PIXELS_PER_POINT: f32 = 96.0 / 72.0;

/// Environment variable naming the font directory.
pub const FONT_DIR_ENV: &str = "BARCODEGEN_FONT_DIR";

/// Font directory used when none is configured.
pub const DEFAULT_FONT_DIR: &str = "fonts";

/// `$BARCODEGEN_FONT_DIR` if set and non-empty, else `./fonts`.
pub fn default_font_directory() -> PathBuf {
    std::env::var_os(FONT_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_DIR))
}

/// Errors that can occur while loading a font resource.
#[derive(Debug, Error)]
pub enum FontError {
    /// No such file in the font directory.
    #[error("font not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read font {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The file is not a usable font.
    #[error("invalid font file: {}", .0.display())]
    Invalid(PathBuf),
}

/// A loaded font file at a specific size.
#[derive(Clone)]
pub struct Font {
    family: String,
    data: Arc<[u8]>,
    size: u32,
}

impl Font {
    /// Wrap font file bytes. The bytes are not checked here; see
    /// [`FontLibrary::load`] for validated loading.
    pub fn new(family: impl Into<String>, data: Arc<[u8]>, size: u32) -> Self {
        Self {
            family: family.into(),
            data,
            size: size.max(1),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Size in points.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The parsed face, or `None` if the bytes are not a font.
    pub fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// Em size in pixels.
    pub fn pixel_size(&self) -> f32 {
        self.size as f32 * PIXELS_PER_POINT
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family)
            .field("size", &self.size)
            .finish()
    }
}

/// Loads fonts from a directory and caches validated font files.
///
/// # Example
///
/// ```no_run
/// use barcodegen::config::FontSpec;
/// use barcodegen::font::FontLibrary;
///
/// let library = FontLibrary::new("fonts");
/// let font = library.load(&FontSpec { family: "Arial.ttf".into(), size: 8 })?;
/// assert_eq!(font.size(), 8);
/// # Ok::<(), barcodegen::font::FontError>(())
/// ```
#[derive(Debug)]
pub struct FontLibrary {
    directory: PathBuf,
    faces: DashMap<String, Arc<[u8]>>,
}

impl FontLibrary {
    /// Create a library rooted at `directory`. Nothing is read yet.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            faces: DashMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of faces loaded so far.
    pub fn cached_faces(&self) -> usize {
        self.faces.len()
    }

    /// Load a font, reading and parsing the file on first use only.
    ///
    /// `spec.family` must already be a validated bare file name.
    pub fn load(&self, spec: &FontSpec) -> Result<Font, FontError> {
        // The entry holds its shard lock while loading, so concurrent first
        // use of the same family parses the file once.
        let face = self
            .faces
            .entry(spec.family.clone())
            .or_try_insert_with(|| {
                let path = self.directory.join(&spec.family);
                tracing::debug!(path = %path.display(), "loading font face");
                read_face(&path)
            })?
            .value()
            .clone();

        Ok(Font::new(spec.family.clone(), face, spec.size))
    }
}

fn read_face(path: &Path) -> Result<Arc<[u8]>, FontError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            FontError::NotFound(path.to_path_buf())
        } else {
            FontError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Face::parse(&bytes, 0).map_err(|_| FontError::Invalid(path.to_path_buf()))?;
    Ok(Arc::from(bytes))
}
