//! Code 39 and Code 39 Extended.

use crate::config::Latin1Text;
use crate::symbology::encoder::{BarcodeEncoder, ChecksumSelect, Variant};
use crate::symbology::{EncodeError, EncodedSymbol, Run, SymbolStyle};

const NARROW: u32 = 1;
const WIDE: u32 = 3;

/// Character set, in check-value order.
const ALPHABET: &[u8; 43] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Nine-element patterns, first element in the most significant bit.
/// A set bit is a wide element. Elements alternate bar, space, bar...
const PATTERNS: [u16; 43] = [
    0x034, 0x121, 0x061, 0x160, 0x031, 0x130, 0x070, 0x025, 0x124, 0x064, // 0-9
    0x109, 0x049, 0x148, 0x019, 0x118, 0x058, 0x00D, 0x10C, 0x04C, 0x01C, // A-J
    0x103, 0x043, 0x142, 0x013, 0x112, 0x052, 0x007, 0x106, 0x046, 0x016, // K-T
    0x181, 0x0C1, 0x1C0, 0x091, 0x190, 0x0D0, // U-Z
    0x085, 0x184, 0x0C4, 0x0A8, 0x0A2, 0x08A, 0x02A, // - . space $ / + %
];

/// Start/stop character `*`.
const GUARD: u16 = 0x094;

/// Full-ASCII escapes into the basic character set.
const EXTENDED: [&str; 128] = [
    "%U", "$A", "$B", "$C", "$D", "$E", "$F", "$G",
    "$H", "$I", "$J", "$K", "$L", "$M", "$N", "$O",
    "$P", "$Q", "$R", "$S", "$T", "$U", "$V", "$W",
    "$X", "$Y", "$Z", "%A", "%B", "%C", "%D", "%E",
    " ", "/A", "/B", "/C", "/D", "/E", "/F", "/G",
    "/H", "/I", "/J", "/K", "/L", "-", ".", "/O",
    "0", "1", "2", "3", "4", "5", "6", "7",
    "8", "9", "/Z", "%F", "%G", "%H", "%I", "%J",
    "%V", "A", "B", "C", "D", "E", "F", "G",
    "H", "I", "J", "K", "L", "M", "N", "O",
    "P", "Q", "R", "S", "T", "U", "V", "W",
    "X", "Y", "Z", "%K", "%L", "%M", "%N", "%O",
    "%W", "+A", "+B", "+C", "+D", "+E", "+F", "+G",
    "+H", "+I", "+J", "+K", "+L", "+M", "+N", "+O",
    "+P", "+Q", "+R", "+S", "+T", "+U", "+V", "+W",
    "+X", "+Y", "+Z", "%P", "%Q", "%R", "%S", "%T",
];

fn check_value(byte: u8) -> Option<usize> {
    ALPHABET.iter().position(|&c| c == byte)
}

fn push_character(runs: &mut Vec<Run>, pattern: u16) {
    for element in 0..9 {
        let wide = pattern & (1 << (8 - element)) != 0;
        let width = if wide { WIDE } else { NARROW };
        runs.push(if element % 2 == 0 {
            Run::bar(width)
        } else {
            Run::space(width)
        });
    }
}

/// Encode characters already in the basic set, framed by `*`.
///
/// Returns the symbol and the check character, if requested.
fn encode_basic(
    symbology: &'static str,
    style: SymbolStyle,
    values: &[usize],
    checksum: bool,
) -> (EncodedSymbol, Option<char>) {
    let mut values = values.to_vec();
    let check = checksum.then(|| {
        let value = values.iter().sum::<usize>() % 43;
        values.push(value);
        char::from(ALPHABET[value])
    });

    let mut runs = Vec::with_capacity((values.len() + 2) * 10);
    push_character(&mut runs, GUARD);
    for &value in &values {
        runs.push(Run::space(NARROW));
        push_character(&mut runs, PATTERNS[value]);
    }
    runs.push(Run::space(NARROW));
    push_character(&mut runs, GUARD);

    tracing::trace!(symbology, characters = values.len(), "encoded code 39 stream");
    let mut symbol = EncodedSymbol::new(style, runs);
    if let Some(check) = check {
        symbol = symbol.with_checksum(check.to_string());
    }
    (symbol, check)
}

/// Code 39 over its 43-character set.
#[derive(Debug, Clone, Default)]
pub struct Code39 {
    style: SymbolStyle,
    checksum: bool,
}

impl Code39 {
    pub const NAME: &'static str = "code39";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn checksum(&self) -> bool {
        self.checksum
    }
}

impl BarcodeEncoder for Code39 {
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
        let values = text
            .as_bytes()
            .iter()
            .enumerate()
            .map(|(position, &b)| {
                check_value(b).ok_or_else(|| EncodeError::invalid_character(Self::NAME, b, position))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (symbol, check) = encode_basic(Self::NAME, self.style.clone(), &values, self.checksum);
        let mut caption = text.to_string();
        caption.extend(check);
        Ok(symbol.with_caption(caption))
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Checksummed(self)
    }
}

impl ChecksumSelect for Code39 {
    fn set_checksum(&mut self, enabled: bool) {
        self.checksum = enabled;
    }
}

/// Code 39 Extended: full ASCII through two-character escapes.
///
/// The check character, if enabled, is computed over the escaped stream.
#[derive(Debug, Clone, Default)]
pub struct Code39Extended {
    style: SymbolStyle,
    checksum: bool,
}

impl Code39Extended {
    pub const NAME: &'static str = "code39extended";

    pub fn new() -> Self {
        Self::default()
    }
}

impl BarcodeEncoder for Code39Extended {
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

        let mut values = Vec::with_capacity(text.len() * 2);
        for (position, &b) in text.as_bytes().iter().enumerate() {
            let escape = EXTENDED
                .get(usize::from(b))
                .ok_or_else(|| EncodeError::invalid_character(Self::NAME, b, position))?;
            // Every escape is drawn from the basic set.
            values.extend(escape.bytes().filter_map(check_value));
        }

        let (symbol, _) = encode_basic(Self::NAME, self.style.clone(), &values, self.checksum);
        let caption: String = text
            .to_string()
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        Ok(symbol.with_caption(caption))
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Checksummed(self)
    }
}

impl ChecksumSelect for Code39Extended {
    fn set_checksum(&mut self, enabled: bool) {
        self.checksum = enabled;
    }
}
