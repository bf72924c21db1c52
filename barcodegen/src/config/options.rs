//! The caller-supplied options bag.
//!
//! Options arrive as loosely typed string pairs (query strings, CLI `-O`
//! flags, config file defaults). Nothing is interpreted here; the resolver
//! in [`crate::config::resolve`] owns all parsing and clamping.

use std::collections::BTreeMap;

/// Option keys recognised by the resolver.
///
/// Any other key is carried in the bag but ignored downstream.
pub mod keys {
    pub const SCALE: &str = "scale";
    pub const DPI: &str = "dpi";
    pub const ROTATION: &str = "rotation";
    pub const THICKNESS: &str = "thickness";
    pub const FONT_FAMILY: &str = "fontFamily";
    pub const FONT_SIZE: &str = "fontSize";
    pub const START: &str = "start";
    pub const CHECKSUM: &str = "checksum";
    pub const BARCODE_IDENTIFIER: &str = "barcodeIdentifier";
    pub const SERVICE_TYPE: &str = "serviceType";
    pub const MAILER_IDENTIFIER: &str = "mailerIdentifier";
    pub const SERIAL_NUMBER: &str = "serialNumber";
    pub const LABEL: &str = "label";
    pub const FOREGROUND_COLOR: &str = "foregroundColor";
    pub const BACKGROUND_COLOR: &str = "backgroundColor";

    /// Legacy query-string spellings and the key they stand for.
    pub(crate) const ALIASES: &[(&str, &str)] = &[
        ("font_family", FONT_FAMILY),
        ("font_size", FONT_SIZE),
    ];
}

/// An ordered, permissive string-to-string options bag.
///
/// # Example
///
/// ```
/// use barcodegen::config::RenderOptions;
///
/// let options = RenderOptions::new()
///     .with("scale", "2")
///     .with("thickness", "30");
///
/// assert_eq!(options.get("scale"), Some("2"));
/// assert_eq!(options.get("unknown"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    values: BTreeMap<String, String>,
}

impl RenderOptions {
    /// Create an empty options bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value. Legacy key spellings are normalised.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let key = keys::ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(key);
        self.values.insert(key, value.into());
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Whether a key is present (even with an empty value).
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Layer these options over `defaults`; keys present here win.
    pub fn over(&self, defaults: &RenderOptions) -> RenderOptions {
        let mut merged = defaults.clone();
        for (key, value) in self.iter() {
            merged.insert(key, value);
        }
        merged
    }

    /// Parse a URL query string (`a=1&b=two+words&c=%2A`).
    ///
    /// Pairs without `=` are stored with an empty value. Malformed percent
    /// escapes are kept literally.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (percent_decode(key), percent_decode(value)),
                None => (percent_decode(pair), String::new()),
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenderOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = RenderOptions::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut options = RenderOptions::new();
        options.insert("scale", "3");
        assert_eq!(options.get("scale"), Some("3"));
        assert!(options.contains_key("scale"));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_legacy_aliases_are_normalised() {
        let options = RenderOptions::new()
            .with("font_family", "Arial.ttf")
            .with("font_size", "10");
        assert_eq!(options.get(keys::FONT_FAMILY), Some("Arial.ttf"));
        assert_eq!(options.get(keys::FONT_SIZE), Some("10"));
        assert_eq!(options.get("font_family"), None);
    }

    #[test]
    fn test_over_prefers_own_values() {
        let defaults = RenderOptions::new().with("scale", "1").with("dpi", "300");
        let request = RenderOptions::new().with("scale", "4");
        let merged = request.over(&defaults);
        assert_eq!(merged.get("scale"), Some("4"));
        assert_eq!(merged.get("dpi"), Some("300"));
    }

    #[test]
    fn test_from_query_legacy_format() {
        let options = RenderOptions::from_query(
            "filetype=PNG&dpi=72&scale=1&rotation=0&font_family=Arial.ttf&font_size=8\
             &text=%2A123456789012345%2A&thickness=30&start=A&code=BCGcode128",
        );
        assert_eq!(options.get("filetype"), Some("PNG"));
        assert_eq!(options.get("text"), Some("*123456789012345*"));
        assert_eq!(options.get(keys::FONT_FAMILY), Some("Arial.ttf"));
        assert_eq!(options.get("code"), Some("BCGcode128"));
        assert_eq!(options.get("start"), Some("A"));
    }

    #[test]
    fn test_from_query_plus_and_bare_keys() {
        let options = RenderOptions::from_query("?label=two+words&checksum&dpi=");
        assert_eq!(options.get("label"), Some("two words"));
        assert_eq!(options.get("checksum"), Some(""));
        assert_eq!(options.get("dpi"), Some(""));
    }

    #[test]
    fn test_percent_decode_malformed_escape_kept() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%41%42"), "AB");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn test_collect_from_pairs() {
        let options: RenderOptions = vec![("scale", "2"), ("thickness", "40")]
            .into_iter()
            .collect();
        assert_eq!(options.len(), 2);
        assert_eq!(options.iter().next(), Some(("scale", "2")));
    }
}
