//! Free-form bar patterns.

use crate::config::Latin1Text;
use crate::symbology::encoder::{BarcodeEncoder, LabelSetup, Variant};
use crate::symbology::{EncodeError, EncodedSymbol, Run, SymbolStyle};

/// Draws an arbitrary pattern: each digit 1-9 is the width of the next
/// run, alternating bar and space and starting with a bar.
///
/// The caption is the configured label rather than the pattern.
#[derive(Debug, Clone, Default)]
pub struct OtherCode {
    style: SymbolStyle,
    label: Option<String>,
}

impl OtherCode {
    pub const NAME: &'static str = "othercode";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl BarcodeEncoder for OtherCode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn style(&self) -> &SymbolStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut SymbolStyle {
        &mut self.style
    }

    fn parse(&self, text: &Latin1Text) -> Result<EncodedSymbol, EncodeError> {
        let runs = text
            .as_bytes()
            .iter()
            .enumerate()
            .map(|(position, &b)| match b {
                b'1'..=b'9' => {
                    let width = u32::from(b - b'0');
                    Ok(if position % 2 == 0 {
                        Run::bar(width)
                    } else {
                        Run::space(width)
                    })
                }
                _ => Err(EncodeError::invalid_character(Self::NAME, b, position)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut symbol = EncodedSymbol::new(self.style.clone(), runs);
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            symbol = symbol.with_caption(label);
        }
        Ok(symbol)
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Labelled(self)
    }
}

impl LabelSetup for OtherCode {
    fn set_label(&mut self, label: &str) {
        self.label = Some(label.to_string());
    }
}
