//! Symbology selection.
//!
//! The registry is the only way to obtain an encoder. It is a closed table
//! built at startup: identifiers are validated against an allow-list
//! pattern before any lookup, so caller input never reaches anything but a
//! map key comparison.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{BarcodeError, BarcodeResult};
use crate::symbology::encoder::{BarcodeEncoder, Family};
use crate::symbology::{
    Code128, Code39, Code39Extended, Gs1128, IntelligentMail, Interleaved2of5, Msi, OtherCode,
    Standard2of5,
};

/// Creates a fresh, unconfigured encoder.
pub type EncoderFactory = Arc<dyn Fn() -> Box<dyn BarcodeEncoder> + Send + Sync>;

/// Prefix of the legacy identifiers (`BCGcode128`).
const LEGACY_PREFIX: &str = "bcg";

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Invalid regex pattern"))
}

/// Check a caller-supplied identifier against the allow-list pattern.
///
/// # Errors
///
/// [`BarcodeError::InvalidSymbology`] unless the identifier is non-empty
/// ASCII alphanumeric.
pub fn validate_identifier(id: &str) -> BarcodeResult<()> {
    if identifier_pattern().is_match(id) {
        Ok(())
    } else {
        Err(BarcodeError::InvalidSymbology(id.to_string()))
    }
}

/// Closed mapping from symbology identifier to encoder factory.
///
/// Lookups are ASCII case-insensitive.
///
/// # Example
///
/// ```
/// use barcodegen::symbology::EncoderRegistry;
///
/// let registry = EncoderRegistry::with_defaults();
/// let encoder = registry.create("BCGcode128").unwrap();
/// assert_eq!(encoder.name(), "code128");
/// assert!(registry.create("../etc/passwd").is_err());
/// ```
#[derive(Clone, Default)]
pub struct EncoderRegistry {
    factories: BTreeMap<String, EncoderFactory>,
    aliases: BTreeMap<String, String>,
}

impl EncoderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in symbology, plus legacy aliases.
    pub fn with_defaults() -> Self {
        fn factory<E: BarcodeEncoder + Default + 'static>() -> EncoderFactory {
            Arc::new(|| Box::new(E::default()) as Box<dyn BarcodeEncoder>)
        }

        let builtins: [(&str, EncoderFactory); 9] = [
            (Code128::NAME, factory::<Code128>()),
            (Gs1128::NAME, factory::<Gs1128>()),
            (Code39::NAME, factory::<Code39>()),
            (Code39Extended::NAME, factory::<Code39Extended>()),
            (Interleaved2of5::NAME, factory::<Interleaved2of5>()),
            (Standard2of5::NAME, factory::<Standard2of5>()),
            (Msi::NAME, factory::<Msi>()),
            (IntelligentMail::NAME, factory::<IntelligentMail>()),
            (OtherCode::NAME, factory::<OtherCode>()),
        ];

        let mut registry = Self::new();
        for (id, factory) in builtins {
            let legacy = format!("{LEGACY_PREFIX}{id}");
            registry.factories.insert(id.to_string(), factory);
            registry.aliases.insert(legacy, id.to_string());
        }
        registry
    }

    /// Register a factory under `id`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// [`BarcodeError::InvalidSymbology`] if `id` is not alphanumeric.
    pub fn register<F>(&mut self, id: &str, factory: F) -> BarcodeResult<&mut Self>
    where
        F: Fn() -> Box<dyn BarcodeEncoder> + Send + Sync + 'static,
    {
        validate_identifier(id)?;
        let key = id.to_ascii_lowercase();
        self.aliases.remove(&key);
        self.factories.insert(key, Arc::new(factory));
        Ok(self)
    }

    /// Make `alias` resolve to the already registered `target`.
    ///
    /// # Errors
    ///
    /// [`BarcodeError::InvalidSymbology`] if either name is malformed,
    /// [`BarcodeError::EncoderNotFound`] if `target` is not registered.
    pub fn alias(&mut self, alias: &str, target: &str) -> BarcodeResult<&mut Self> {
        validate_identifier(alias)?;
        validate_identifier(target)?;
        let target = target.to_ascii_lowercase();
        if !self.factories.contains_key(&target) {
            return Err(BarcodeError::EncoderNotFound(target));
        }
        self.aliases.insert(alias.to_ascii_lowercase(), target);
        Ok(self)
    }

    /// Resolve `id` to a factory.
    ///
    /// # Errors
    ///
    /// [`BarcodeError::InvalidSymbology`] for malformed identifiers (checked
    /// first), [`BarcodeError::EncoderNotFound`] for unknown ones.
    pub fn select(&self, id: &str) -> BarcodeResult<EncoderFactory> {
        validate_identifier(id)?;
        let key = id.to_ascii_lowercase();
        let canonical = self.aliases.get(&key).unwrap_or(&key);
        self.factories
            .get(canonical)
            .cloned()
            .ok_or_else(|| BarcodeError::EncoderNotFound(id.to_string()))
    }

    /// Resolve `id` and create a fresh encoder.
    pub fn create(&self, id: &str) -> BarcodeResult<Box<dyn BarcodeEncoder>> {
        self.select(id).map(|factory| factory())
    }

    /// Canonical identifiers, sorted.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Legacy aliases and the identifier each resolves to.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, target)| (alias.as_str(), target.as_str()))
    }

    /// Every canonical identifier with the family of its encoder.
    pub fn families(&self) -> Vec<(String, Family)> {
        self.factories
            .iter()
            .map(|(id, factory)| {
                let mut encoder = factory();
                (id.clone(), encoder.variant().family())
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for EncoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderRegistry")
            .field("identifiers", &self.factories.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}
