//! Input text normalisation.
//!
//! Encoders work on single-byte (ISO-8859-1) text. Caller text arrives as
//! Unicode that may still carry backslash escapes from a form or query
//! layer, so it is unescaped and then narrowed. Characters above U+00FF
//! have no single-byte form and are replaced with `?`; this loss is
//! expected and is not an error.

use std::fmt;

/// Substitute for characters that have no ISO-8859-1 form.
pub const SUBSTITUTE: u8 = b'?';

/// Text in ISO-8859-1, one byte per character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Latin1Text(Vec<u8>);

impl Latin1Text {
    /// Wrap raw ISO-8859-1 bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Narrow a Unicode string, replacing unmappable characters.
    ///
    /// Returns the text and the number of characters replaced.
    pub fn from_str_lossy(text: &str) -> (Self, usize) {
        let mut lost = 0;
        let bytes = text
            .chars()
            .map(|c| match u8::try_from(u32::from(c)) {
                Ok(b) => b,
                Err(_) => {
                    lost += 1;
                    SUBSTITUTE
                }
            })
            .collect();
        (Self(bytes), lost)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Latin1Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Every ISO-8859-1 byte maps to the Unicode code point of the same value.
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

/// Remove backslash escapes (`\'` -> `'`, `\\` -> `\`, `\0` -> NUL).
///
/// A trailing lone backslash is dropped.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(next) => out.push(next),
            None => {}
        }
    }
    out
}

/// Prepare caller text for an encoder: unescape, then narrow to ISO-8859-1.
pub fn convert_text(raw: &str) -> Latin1Text {
    let (text, lost) = Latin1Text::from_str_lossy(&unescape(raw));
    if lost > 0 {
        tracing::debug!(
            lost,
            "input text contained characters outside ISO-8859-1; replaced with '?'"
        );
    }
    text
}
