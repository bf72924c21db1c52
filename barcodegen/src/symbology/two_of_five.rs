//! Interleaved 2 of 5 and Standard (industrial) 2 of 5.
//!
//! Both encode digits with five elements each, two of them wide. The
//! interleaved form packs digit pairs into bars and spaces; the standard
//! form carries data in the bars only.

use crate::config::Latin1Text;
use crate::symbology::checksum::{digit_values, mod10};
use crate::symbology::encoder::{BarcodeEncoder, ChecksumSelect, Variant};
use crate::symbology::{EncodeError, EncodedSymbol, Run, SymbolStyle};

const NARROW: u32 = 1;
const WIDE: u32 = 3;

/// Five elements per digit, first element in bit 4; set bits are wide.
const DIGITS: [u8; 10] = [
    0b00110, 0b10001, 0b01001, 0b11000, 0b00101, 0b10100, 0b01100, 0b00011, 0b10010, 0b01010,
];

fn width(pattern: u8, element: usize) -> u32 {
    if pattern & (1 << (4 - element)) != 0 {
        WIDE
    } else {
        NARROW
    }
}

/// Parse digits and append the check digit when enabled.
fn prepare_digits(
    symbology: &'static str,
    text: &Latin1Text,
    checksum: bool,
) -> Result<Vec<u8>, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::length(symbology, "no data to encode"));
    }
    let mut digits = digit_values(text.as_bytes()).ok_or_else(|| {
        let position = text
            .as_bytes()
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or_default();
        EncodeError::invalid_character(symbology, text.as_bytes()[position], position)
    })?;
    if checksum {
        digits.push(mod10(&digits));
    }
    Ok(digits)
}

fn caption(digits: &[u8]) -> String {
    digits.iter().map(|&d| char::from(b'0' + d)).collect()
}

/// Interleaved 2 of 5. The digit count, check digit included, must be even.
#[derive(Debug, Clone, Default)]
pub struct Interleaved2of5 {
    style: SymbolStyle,
    checksum: bool,
}

impl Interleaved2of5 {
    pub const NAME: &'static str = "i25";

    pub fn new() -> Self {
        Self::default()
    }
}

impl BarcodeEncoder for Interleaved2of5 {
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
        let digits = prepare_digits(Self::NAME, text, self.checksum)?;
        if digits.len() % 2 != 0 {
            return Err(EncodeError::length(
                Self::NAME,
                format!(
                    "needs an even number of digits including any check digit, got {}",
                    digits.len()
                ),
            ));
        }

        let mut runs = vec![
            Run::bar(NARROW),
            Run::space(NARROW),
            Run::bar(NARROW),
            Run::space(NARROW),
        ];
        for pair in digits.chunks_exact(2) {
            let (bars, spaces) = (DIGITS[usize::from(pair[0])], DIGITS[usize::from(pair[1])]);
            for element in 0..5 {
                runs.push(Run::bar(width(bars, element)));
                runs.push(Run::space(width(spaces, element)));
            }
        }
        runs.extend([Run::bar(WIDE), Run::space(NARROW), Run::bar(NARROW)]);

        let mut symbol = EncodedSymbol::new(self.style.clone(), runs).with_caption(caption(&digits));
        if self.checksum {
            if let Some(&check) = digits.last() {
                symbol = symbol.with_checksum(check.to_string());
            }
        }
        Ok(symbol)
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Checksummed(self)
    }
}

impl ChecksumSelect for Interleaved2of5 {
    fn set_checksum(&mut self, enabled: bool) {
        self.checksum = enabled;
    }
}

/// Standard 2 of 5: data in the bars, narrow spaces throughout.
#[derive(Debug, Clone, Default)]
pub struct Standard2of5 {
    style: SymbolStyle,
    checksum: bool,
}

impl Standard2of5 {
    pub const NAME: &'static str = "s25";

    pub fn new() -> Self {
        Self::default()
    }
}

impl BarcodeEncoder for Standard2of5 {
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
        let digits = prepare_digits(Self::NAME, text, self.checksum)?;

        // Start and stop are both wide, narrow, wide bars.
        let guard = [
            Run::bar(WIDE),
            Run::space(NARROW),
            Run::bar(WIDE),
            Run::space(NARROW),
            Run::bar(NARROW),
            Run::space(NARROW),
        ];
        let mut runs = guard.to_vec();
        for &digit in &digits {
            let pattern = DIGITS[usize::from(digit)];
            for element in 0..5 {
                runs.push(Run::bar(width(pattern, element)));
                runs.push(Run::space(NARROW));
            }
        }
        runs.extend([
            Run::bar(WIDE),
            Run::space(NARROW),
            Run::bar(NARROW),
            Run::space(NARROW),
            Run::bar(WIDE),
        ]);

        let mut symbol = EncodedSymbol::new(self.style.clone(), runs).with_caption(caption(&digits));
        if self.checksum {
            if let Some(&check) = digits.last() {
                symbol = symbol.with_checksum(check.to_string());
            }
        }
        Ok(symbol)
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Checksummed(self)
    }
}

impl ChecksumSelect for Standard2of5 {
    fn set_checksum(&mut self, enabled: bool) {
        self.checksum = enabled;
    }
}
