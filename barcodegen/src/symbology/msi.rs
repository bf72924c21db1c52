//! MSI Plessey.

use crate::config::Latin1Text;
use crate::symbology::checksum::{digit_values, luhn};
use crate::symbology::encoder::{BarcodeEncoder, ChecksumSelect, Variant};
use crate::symbology::{EncodeError, EncodedSymbol, Run, SymbolStyle};

/// MSI Plessey: each digit is four bits, most significant first.
///
/// A one bit is a two-module bar and a one-module space; a zero bit is the
/// reverse.
#[derive(Debug, Clone, Default)]
pub struct Msi {
    style: SymbolStyle,
    checksum: bool,
}

impl Msi {
    pub const NAME: &'static str = "msi";

    pub fn new() -> Self {
        Self::default()
    }
}

fn push_bit(runs: &mut Vec<Run>, set: bool) {
    if set {
        runs.extend([Run::bar(2), Run::space(1)]);
    } else {
        runs.extend([Run::bar(1), Run::space(2)]);
    }
}

impl BarcodeEncoder for Msi {
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
        if text.is_empty() {
            return Err(EncodeError::length(Self::NAME, "no data to encode"));
        }
        let Some(mut digits) = digit_values(text.as_bytes()) else {
            let (position, &byte) = text
                .as_bytes()
                .iter()
                .enumerate()
                .find(|(_, b)| !b.is_ascii_digit())
                .unwrap_or((0, &b'?'));
            return Err(EncodeError::invalid_character(Self::NAME, byte, position));
        };

        let check = self.checksum.then(|| luhn(&digits));
        digits.extend(check);

        let mut runs = Vec::with_capacity(digits.len() * 8 + 5);
        push_bit(&mut runs, true);
        for &digit in &digits {
            for bit in (0..4).rev() {
                push_bit(&mut runs, digit & (1 << bit) != 0);
            }
        }
        runs.extend([Run::bar(1), Run::space(2), Run::bar(1)]);

        let caption: String = digits.iter().map(|&d| char::from(b'0' + d)).collect();
        let mut symbol = EncodedSymbol::new(self.style.clone(), runs).with_caption(caption);
        if let Some(check) = check {
            symbol = symbol.with_checksum(check.to_string());
        }
        Ok(symbol)
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Checksummed(self)
    }
}

impl ChecksumSelect for Msi {
    fn set_checksum(&mut self, enabled: bool) {
        self.checksum = enabled;
    }
}
