//! USPS Intelligent Mail barcode (4-state customer barcode).
//!
//! The 20-digit tracking code and the 0/5/9/11-digit routing code are
//! packed into one binary value, protected by an 11-bit CRC, split into
//! ten codewords and mapped onto 65 bars through the fixed bar table.
//!
//! ```text
//! tracking + routing ──► binary value ──► codewords ──► characters ──► 65 bars
//!                              │                            ▲
//!                              └──────── CRC-11 ────────────┘
//! ```

use std::sync::OnceLock;

use crate::config::{keys, ConfigError, Latin1Text, TrackingCode};
use crate::symbology::checksum::digit_values;
use crate::symbology::encoder::{BarcodeEncoder, TrackingSetup, Variant};
use crate::symbology::{BarExtent, EncodeError, EncodedSymbol, Run, SymbolStyle};

/// Quiet zone in modules.
const QUIET_ZONE: u32 = 6;

const BAR_COUNT: usize = 65;

/// For each bar, the (character, bit) driving its descender and ascender.
const BARS: [[(u8, u8); 2]; BAR_COUNT] = [
    [(7, 2), (4, 3)], [(1, 10), (0, 0)], [(9, 12), (2, 8)], [(5, 5), (6, 11)],
    [(8, 9), (3, 1)], [(0, 1), (5, 12)], [(2, 5), (1, 8)], [(4, 4), (9, 11)],
    [(6, 3), (8, 10)], [(3, 9), (7, 6)], [(5, 11), (1, 4)], [(8, 5), (2, 12)],
    [(9, 10), (0, 2)], [(7, 1), (6, 7)], [(3, 6), (4, 9)], [(0, 3), (8, 6)],
    [(6, 4), (2, 7)], [(1, 1), (9, 9)], [(7, 10), (5, 2)], [(4, 0), (3, 8)],
    [(6, 2), (0, 4)], [(8, 11), (1, 0)], [(9, 8), (3, 12)], [(2, 6), (7, 7)],
    [(5, 1), (4, 10)], [(1, 12), (6, 9)], [(7, 3), (8, 0)], [(5, 8), (9, 7)],
    [(4, 6), (2, 10)], [(3, 4), (0, 5)], [(8, 4), (5, 7)], [(7, 11), (1, 9)],
    [(6, 0), (9, 6)], [(0, 6), (4, 8)], [(2, 1), (3, 2)], [(5, 9), (8, 12)],
    [(4, 11), (6, 1)], [(9, 5), (7, 4)], [(3, 3), (1, 2)], [(0, 7), (2, 0)],
    [(1, 3), (4, 1)], [(6, 10), (3, 5)], [(8, 7), (9, 4)], [(2, 11), (5, 6)],
    [(0, 8), (7, 12)], [(4, 2), (8, 1)], [(5, 10), (3, 0)], [(9, 3), (0, 9)],
    [(6, 5), (2, 4)], [(7, 8), (1, 7)], [(5, 0), (4, 5)], [(2, 3), (0, 10)],
    [(6, 12), (9, 2)], [(3, 11), (1, 6)], [(8, 8), (7, 9)], [(5, 4), (0, 11)],
    [(1, 5), (2, 2)], [(9, 1), (4, 12)], [(8, 3), (6, 6)], [(7, 0), (3, 7)],
    [(4, 7), (7, 5)], [(0, 12), (1, 11)], [(2, 9), (9, 0)], [(6, 8), (5, 3)],
    [(3, 10), (8, 2)],
];

const CRC_POLYNOMIAL: u16 = 0x0F35;

/// 5-of-13 and 2-of-13 character tables.
struct CharacterTables {
    five_of_13: [u16; 1287],
    two_of_13: [u16; 78],
}

fn character_tables() -> &'static CharacterTables {
    static TABLES: OnceLock<CharacterTables> = OnceLock::new();
    TABLES.get_or_init(|| CharacterTables {
        five_of_13: n_of_13(5),
        two_of_13: n_of_13(2),
    })
}

fn reverse_13(value: u16) -> u16 {
    value.reverse_bits() >> 3
}

/// All 13-bit values with `ones` bits set.
///
/// Values that differ from their bit reversal are stored pairwise from the
/// front; palindromes are stored from the back.
fn n_of_13<const N: usize>(ones: u32) -> [u16; N] {
    let mut table = [0u16; N];
    let (mut low, mut high) = (0, N - 1);
    for value in 0u16..8192 {
        if value.count_ones() != ones {
            continue;
        }
        let reversed = reverse_13(value);
        if reversed < value {
            continue;
        }
        if reversed == value {
            table[high] = value;
            high = high.saturating_sub(1);
        } else {
            table[low] = value;
            table[low + 1] = reversed;
            low += 2;
        }
    }
    table
}

/// CRC-11 over the 102-bit value held in 13 bytes.
fn crc11(bytes: &[u8; 13]) -> u16 {
    let mut fcs: u16 = 0x07FF;

    let mut step = |data: &mut u16, bits: u32| {
        for _ in 0..bits {
            fcs = if (fcs ^ *data) & 0x400 != 0 {
                (fcs << 1) ^ CRC_POLYNOMIAL
            } else {
                fcs << 1
            };
            fcs &= 0x7FF;
            *data <<= 1;
        }
    };

    // The top two bits of the first byte are unused.
    let mut data = u16::from(bytes[0]) << 5;
    step(&mut data, 6);
    for &byte in &bytes[1..] {
        let mut data = u16::from(byte) << 3;
        step(&mut data, 8);
    }
    fcs
}

fn routing_value(routing: &[u8]) -> u128 {
    let zip = routing
        .iter()
        .fold(0u128, |acc, &d| acc * 10 + u128::from(d));
    match routing.len() {
        5 => zip + 1,
        9 => zip + 100_001,
        11 => zip + 1_000_100_001,
        _ => 0,
    }
}

/// Bar states for a validated tracking code and routing code.
fn encode_bars(tracking: &[u8; 20], routing: &[u8]) -> [BarExtent; BAR_COUNT] {
    let mut value = routing_value(routing);
    value = value * 10 + u128::from(tracking[0]);
    value = value * 5 + u128::from(tracking[1]);
    for &digit in &tracking[2..] {
        value = value * 10 + u128::from(digit);
    }

    let mut bytes = [0u8; 13];
    bytes.copy_from_slice(&value.to_be_bytes()[3..]);
    let fcs = crc11(&bytes);

    let mut codewords = [0u16; 10];
    codewords[9] = (value % 636) as u16;
    value /= 636;
    for codeword in codewords[..9].iter_mut().rev() {
        *codeword = (value % 1365) as u16;
        value /= 1365;
    }
    codewords[9] *= 2;
    if fcs & 0x400 != 0 {
        codewords[0] += 659;
    }

    let tables = character_tables();
    let mut characters = [0u16; 10];
    for (i, (character, &codeword)) in characters.iter_mut().zip(&codewords).enumerate() {
        let codeword = usize::from(codeword);
        *character = if codeword < tables.five_of_13.len() {
            tables.five_of_13[codeword]
        } else {
            tables.two_of_13[codeword - tables.five_of_13.len()]
        };
        if fcs & (1 << i) != 0 {
            *character ^= 0x1FFF;
        }
    }

    let bit = |(character, index): (u8, u8)| characters[usize::from(character)] & (1 << index) != 0;
    BARS.map(|[descender, ascender]| match (bit(descender), bit(ascender)) {
        (true, true) => BarExtent::Full,
        (true, false) => BarExtent::Descender,
        (false, true) => BarExtent::Ascender,
        (false, false) => BarExtent::Tracker,
    })
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidAttribute {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Validate a tracking code and lay it out as its 20 digits.
fn tracking_digits(code: &TrackingCode) -> Result<[u8; 20], ConfigError> {
    let TrackingCode {
        barcode_identifier,
        service_type,
        mailer_identifier,
        serial_number,
    } = *code;

    if barcode_identifier > 94 || barcode_identifier % 10 > 4 {
        return Err(invalid(
            keys::BARCODE_IDENTIFIER,
            "must be two digits with the second digit in 0-4",
        ));
    }
    if service_type > 999 {
        return Err(invalid(keys::SERVICE_TYPE, "must be at most three digits"));
    }

    let formatted = match mailer_identifier {
        0..=899_999 => {
            if serial_number > 999_999_999 {
                return Err(invalid(
                    keys::SERIAL_NUMBER,
                    "must be at most nine digits with a six-digit mailer identifier",
                ));
            }
            format!("{barcode_identifier:02}{service_type:03}{mailer_identifier:06}{serial_number:09}")
        }
        900_000_000..=999_999_999 => {
            if serial_number > 999_999 {
                return Err(invalid(
                    keys::SERIAL_NUMBER,
                    "must be at most six digits with a nine-digit mailer identifier",
                ));
            }
            format!("{barcode_identifier:02}{service_type:03}{mailer_identifier:09}{serial_number:06}")
        }
        _ => {
            return Err(invalid(
                keys::MAILER_IDENTIFIER,
                "must be six digits (below 900000) or nine digits starting with 9",
            ))
        }
    };

    let mut digits = [0u8; 20];
    for (digit, byte) in digits.iter_mut().zip(formatted.bytes()) {
        *digit = byte - b'0';
    }
    Ok(digits)
}

/// Intelligent Mail barcode. The text to encode is the routing (ZIP) code.
#[derive(Debug, Clone, Default)]
pub struct IntelligentMail {
    style: SymbolStyle,
    tracking: Option<[u8; 20]>,
}

impl IntelligentMail {
    pub const NAME: &'static str = "intelligentmail";

    pub fn new() -> Self {
        Self::default()
    }

    /// The configured tracking code as a 20-digit string.
    pub fn tracking_code(&self) -> Option<String> {
        self.tracking
            .map(|digits| digits.iter().map(|&d| char::from(b'0' + d)).collect())
    }
}

impl BarcodeEncoder for IntelligentMail {
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
        let tracking = self.tracking.ok_or(EncodeError::MissingTrackingCode)?;

        let routing = digit_values(text.as_bytes()).ok_or_else(|| {
            let position = text
                .as_bytes()
                .iter()
                .position(|b| !b.is_ascii_digit())
                .unwrap_or_default();
            EncodeError::invalid_character(Self::NAME, text.as_bytes()[position], position)
        })?;
        if !matches!(routing.len(), 0 | 5 | 9 | 11) {
            return Err(EncodeError::length(
                Self::NAME,
                format!("routing code must be 0, 5, 9 or 11 digits, got {}", routing.len()),
            ));
        }

        let mut runs = Vec::with_capacity(BAR_COUNT * 2 - 1);
        for (i, extent) in encode_bars(&tracking, &routing).into_iter().enumerate() {
            if i > 0 {
                runs.push(Run::space(1));
            }
            runs.push(Run::state(extent));
        }

        let mut caption = self.tracking_code().unwrap_or_default();
        if !text.is_empty() {
            caption.push(' ');
            caption.push_str(&text.to_string());
        }
        Ok(EncodedSymbol::new(self.style.clone(), runs)
            .with_caption(caption)
            .with_quiet_zone(QUIET_ZONE))
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Tracking(self)
    }
}

impl TrackingSetup for IntelligentMail {
    fn set_tracking_code(&mut self, code: TrackingCode) -> Result<(), ConfigError> {
        self.tracking = Some(tracking_digits(&code)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: TrackingCode = TrackingCode {
        barcode_identifier: 1,
        service_type: 234,
        mailer_identifier: 567_094,
        serial_number: 987_654_321,
    };

    fn states(symbol: &EncodedSymbol) -> String {
        symbol
            .runs()
            .iter()
            .filter(|run| run.dark)
            .map(|run| match run.extent {
                BarExtent::Full => 'F',
                BarExtent::Ascender => 'A',
                BarExtent::Descender => 'D',
                BarExtent::Tracker => 'T',
            })
            .collect()
    }

    fn encode(routing: &str) -> EncodedSymbol {
        let mut encoder = IntelligentMail::new();
        encoder.set_tracking_code(SAMPLE).unwrap();
        encoder.parse(&Latin1Text::from_bytes(routing)).unwrap()
    }

    #[test]
    fn test_tables() {
        let tables = character_tables();
        assert!(tables.five_of_13.iter().all(|c| c.count_ones() == 5));
        assert!(tables.two_of_13.iter().all(|c| c.count_ones() == 2));
        assert_eq!(tables.five_of_13[0], 0x001F);
        assert_eq!(tables.five_of_13[1], 0x1F00);
        assert_eq!(tables.two_of_13[0], 0x0003);
        assert_eq!(tables.two_of_13[1], 0x1800);
    }

    #[test]
    fn test_bar_table_covers_every_bit() {
        let mut seen = std::collections::HashSet::new();
        for [descender, ascender] in BARS {
            assert!(seen.insert(descender));
            assert!(seen.insert(ascender));
        }
        assert_eq!(seen.len(), 130);
    }

    #[test]
    fn test_no_routing() {
        assert_eq!(
            states(&encode("")),
            "ATTFATTDTTADTAATTDTDTATTDAFDDFADFDFTFFFFFTATFAAAATDFFTDAADFTFDTDT"
        );
    }

    #[test]
    fn test_five_digit_routing() {
        assert_eq!(
            states(&encode("01234")),
            "DTTAFADDTTFTDTFTFDTDDADADAFADFATDDFTAAAFDTTADFAAATDFDTDFADDDTDFFT"
        );
    }

    #[test]
    fn test_nine_digit_routing() {
        assert_eq!(
            states(&encode("012345678")),
            "ADFTTAFDTTTTFATTADTAAATFTFTATDAAAFDDADATATDTDTTDFDTDATADADTDFFTFA"
        );
    }

    #[test]
    fn test_eleven_digit_routing() {
        let symbol = encode("01234567891");
        assert_eq!(
            states(&symbol),
            "AADTFFDFTDADTAADAATFDTDDAAADDTDTTDAFADADDDTFFFDDTTTADFAAADFTDAADA"
        );
        assert_eq!(symbol.runs().len(), 129);
        assert_eq!(symbol.quiet_zone(), 6);
        assert_eq!(symbol.caption(), Some("01234567094987654321 01234567891"));
    }

    #[test]
    fn test_missing_tracking_code() {
        let err = IntelligentMail::new()
            .parse(&Latin1Text::from_bytes("01234"))
            .unwrap_err();
        assert_eq!(err, EncodeError::MissingTrackingCode);
    }

    #[test]
    fn test_routing_length() {
        let mut encoder = IntelligentMail::new();
        encoder.set_tracking_code(SAMPLE).unwrap();
        let err = encoder
            .parse(&Latin1Text::from_bytes("1234"))
            .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidLength { .. }));
    }

    #[test]
    fn test_tracking_code_formatting() {
        let mut encoder = IntelligentMail::new();
        encoder.set_tracking_code(SAMPLE).unwrap();
        assert_eq!(
            encoder.tracking_code().as_deref(),
            Some("01234567094987654321")
        );

        encoder
            .set_tracking_code(TrackingCode {
                mailer_identifier: 901_234_567,
                serial_number: 12,
                ..SAMPLE
            })
            .unwrap();
        assert_eq!(
            encoder.tracking_code().as_deref(),
            Some("01234901234567000012")
        );
    }

    #[test]
    fn test_tracking_code_validation() {
        let mut encoder = IntelligentMail::new();
        let cases = [
            (TrackingCode { barcode_identifier: 95, ..SAMPLE }, "barcodeIdentifier"),
            (TrackingCode { barcode_identifier: 15, ..SAMPLE }, "barcodeIdentifier"),
            (TrackingCode { service_type: 1000, ..SAMPLE }, "serviceType"),
            (TrackingCode { mailer_identifier: 900_000, ..SAMPLE }, "mailerIdentifier"),
            (
                TrackingCode {
                    mailer_identifier: 912_345_678,
                    serial_number: 1_000_000,
                    ..SAMPLE
                },
                "serialNumber",
            ),
        ];
        for (code, expected_key) in cases {
            let err = encoder.set_tracking_code(code).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidAttribute { ref key, .. } if key == expected_key),
                "{code:?}"
            );
        }
        assert!(encoder.tracking_code().is_none());
    }
}
