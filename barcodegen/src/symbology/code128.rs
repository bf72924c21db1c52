//! Code 128 and GS1-128.
//!
//! Text is split into code set A, B and C segments greedily: set C packs
//! digit pairs and is entered for runs of at least four digits at the end
//! of the data (or six in the middle); A is preferred over B only when a
//! control character appears before any lower-case letter. A `start`
//! override forces the first set and the rest is still chosen
//! automatically.

use crate::config::{keys, ConfigError, Latin1Text};
use crate::symbology::checksum::{digit_values, mod10};
use crate::symbology::encoder::{BarcodeEncoder, StartSelect, Variant};
use crate::symbology::symbol::push_pattern;
use crate::symbology::{EncodeError, EncodedSymbol, SymbolStyle};

/// Element widths for symbol values 0..=105.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4], [2, 1, 1, 2, 3, 2],
];

const STOP_PATTERN: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

/// A Code 128 code set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    /// Parse a `start` option value. Empty, `auto` and `null` mean automatic.
    pub fn parse_start(start: Option<&str>) -> Result<Option<Self>, ConfigError> {
        let Some(raw) = start.map(str::trim) else {
            return Ok(None);
        };
        match raw.to_ascii_uppercase().as_str() {
            "" | "AUTO" | "NULL" => Ok(None),
            "A" => Ok(Some(CodeSet::A)),
            "B" => Ok(Some(CodeSet::B)),
            "C" => Ok(Some(CodeSet::C)),
            _ => Err(ConfigError::InvalidAttribute {
                key: keys::START.to_string(),
                reason: format!("'{raw}' is not a code set (expected A, B or C)"),
            }),
        }
    }

    fn start_value(self) -> u8 {
        match self {
            CodeSet::A => START_A,
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }
    }

    /// Value that switches from any other set to this one.
    fn switch_value(self) -> u8 {
        match self {
            CodeSet::A => CODE_A,
            CodeSet::B => CODE_B,
            CodeSet::C => CODE_C,
        }
    }
}

/// One input unit: a data byte or the FNC1 function character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Byte(u8),
    Fnc1,
}

impl Token {
    fn digit(self) -> Option<u8> {
        match self {
            Token::Byte(b) if b.is_ascii_digit() => Some(b - b'0'),
            _ => None,
        }
    }
}

fn digit_run(tokens: &[Token]) -> usize {
    tokens.iter().take_while(|t| t.digit().is_some()).count()
}

/// A or B, whichever the upcoming data needs first.
fn choose_a_or_b(tokens: &[Token]) -> CodeSet {
    for token in tokens {
        match *token {
            Token::Byte(b) if b < 32 => return CodeSet::A,
            Token::Byte(b) if b >= 96 => return CodeSet::B,
            _ => {}
        }
    }
    CodeSet::B
}

fn initial_set(tokens: &[Token]) -> CodeSet {
    let data = match tokens.iter().position(|t| *t != Token::Fnc1) {
        Some(first) => &tokens[first..],
        None => return CodeSet::C,
    };
    let run = digit_run(data);
    if run >= 4 || (run >= 2 && run % 2 == 0 && run == data.len()) {
        CodeSet::C
    } else {
        choose_a_or_b(data)
    }
}

fn fits(set: CodeSet, byte: u8) -> bool {
    match set {
        CodeSet::A => byte < 96,
        CodeSet::B => byte >= 32,
        CodeSet::C => false,
    }
}

fn byte_value(set: CodeSet, byte: u8) -> u8 {
    match set {
        CodeSet::A if byte < 32 => byte + 64,
        _ => byte - 32,
    }
}

/// Symbol values for `tokens`: start, data, check and stop.
fn symbol_values(
    symbology: &'static str,
    tokens: &[Token],
    start: Option<CodeSet>,
) -> Result<Vec<u8>, EncodeError> {
    for (position, token) in tokens.iter().enumerate() {
        if let Token::Byte(b) = *token {
            if b > 127 {
                return Err(EncodeError::invalid_character(symbology, b, position));
            }
        }
    }

    let mut set = start.unwrap_or_else(|| initial_set(tokens));
    let mut values = vec![set.start_value()];
    let mut i = 0;

    while i < tokens.len() {
        let rest = &tokens[i..];

        if set == CodeSet::C {
            if rest[0] == Token::Fnc1 {
                values.push(FNC1);
                i += 1;
                continue;
            }
            match (rest[0].digit(), rest.get(1).and_then(|t| t.digit())) {
                (Some(tens), Some(units)) => {
                    values.push(tens * 10 + units);
                    i += 2;
                }
                _ => {
                    set = choose_a_or_b(rest);
                    values.push(set.switch_value());
                }
            }
            continue;
        }

        let run = digit_run(rest);
        if run >= 4 && (run == rest.len() || run >= 6) {
            // An odd run leaves its first digit in the current set.
            if run % 2 == 1 {
                if let Token::Byte(b) = rest[0] {
                    values.push(byte_value(set, b));
                }
                i += 1;
            }
            set = CodeSet::C;
            values.push(CODE_C);
            continue;
        }

        match rest[0] {
            Token::Fnc1 => values.push(FNC1),
            Token::Byte(b) => {
                if !fits(set, b) {
                    set = if set == CodeSet::A {
                        CodeSet::B
                    } else {
                        CodeSet::A
                    };
                    values.push(set.switch_value());
                }
                values.push(byte_value(set, b));
            }
        }
        i += 1;
    }

    // The start value has weight 1, like the first data value.
    let weighted: u32 = values
        .iter()
        .enumerate()
        .map(|(k, &v)| u32::from(v) * (k as u32).max(1))
        .sum();
    values.push((weighted % 103) as u8);
    values.push(STOP);
    Ok(values)
}

fn build_symbol(style: SymbolStyle, values: &[u8]) -> EncodedSymbol {
    let mut runs = Vec::with_capacity(values.len() * 6 + 1);
    for &value in values {
        if value == STOP {
            push_pattern(&mut runs, &STOP_PATTERN);
        } else {
            push_pattern(&mut runs, &PATTERNS[usize::from(value)]);
        }
    }
    let check = values[values.len() - 2];
    EncodedSymbol::new(style, runs).with_checksum(check.to_string())
}

/// Code 128 with automatic code set selection.
#[derive(Debug, Clone, Default)]
pub struct Code128 {
    style: SymbolStyle,
    start: Option<CodeSet>,
}

impl Code128 {
    pub const NAME: &'static str = "code128";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<CodeSet> {
        self.start
    }
}

impl BarcodeEncoder for Code128 {
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
        let tokens: Vec<Token> = text.as_bytes().iter().map(|&b| Token::Byte(b)).collect();
        let values = symbol_values(Self::NAME, &tokens, self.start)?;
        Ok(build_symbol(self.style.clone(), &values).with_caption(text.to_string()))
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Sequential(self)
    }
}

impl StartSelect for Code128 {
    fn set_start(&mut self, start: Option<&str>) -> Result<(), ConfigError> {
        self.start = CodeSet::parse_start(start)?;
        Ok(())
    }
}

/// Data lengths of application identifiers with a predefined length.
///
/// Keyed by the first two digits of the AI. Everything else is variable
/// length and is terminated with FNC1 unless it is the last element.
fn predefined_length(ai: &str) -> Option<usize> {
    let length = match ai.get(..2)? {
        "00" => 18,
        "01" | "02" | "03" => 14,
        "04" => 16,
        "11" | "12" | "13" | "14" | "15" | "16" | "17" | "18" | "19" => 6,
        "20" => 2,
        "31" | "32" | "33" | "34" | "35" | "36" => 6,
        "41" => 13,
        _ => return None,
    };
    Some(length)
}

/// AIs whose data ends in a GS1 mod-10 check digit.
fn has_check_digit(ai: &str) -> bool {
    matches!(ai, "00" | "01" | "02")
}

/// One `(AI)data` element.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    ai: String,
    data: String,
}

fn parse_elements(text: &str) -> Result<Vec<Element>, EncodeError> {
    const NAME: &str = Gs1128::NAME;

    let Some(mut rest) = text.strip_prefix('(') else {
        return Err(EncodeError::structure(
            NAME,
            "data must start with an application identifier in parentheses",
        ));
    };

    let mut elements = Vec::new();
    loop {
        let close = rest
            .find(')')
            .ok_or_else(|| EncodeError::structure(NAME, "unterminated application identifier"))?;
        let ai = &rest[..close];
        if !(2..=4).contains(&ai.len()) || !ai.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EncodeError::structure(
                NAME,
                format!("'{ai}' is not a 2-4 digit application identifier"),
            ));
        }
        rest = &rest[close + 1..];

        let end = rest.find('(').unwrap_or(rest.len());
        let data = &rest[..end];
        if data.is_empty() {
            return Err(EncodeError::length(
                NAME,
                format!("application identifier ({ai}) has no data"),
            ));
        }
        elements.push(Element {
            ai: ai.to_string(),
            data: data.to_string(),
        });

        if end == rest.len() {
            return Ok(elements);
        }
        rest = &rest[end + 1..];
    }
}

/// Check predefined lengths and complete or verify check digits.
fn normalise_element(mut element: Element) -> Result<Element, EncodeError> {
    const NAME: &str = Gs1128::NAME;

    let Some(expected) = predefined_length(&element.ai) else {
        return Ok(element);
    };

    if has_check_digit(&element.ai) {
        let digits = digit_values(element.data.as_bytes()).ok_or_else(|| {
            EncodeError::structure(NAME, format!("({}) must be numeric", element.ai))
        })?;
        if digits.len() + 1 == expected {
            element.data.push(char::from(b'0' + mod10(&digits)));
            return Ok(element);
        }
        if digits.len() == expected {
            let (body, check) = digits.split_at(expected - 1);
            if mod10(body) != check[0] {
                return Err(EncodeError::structure(
                    NAME,
                    format!("({}) check digit is wrong", element.ai),
                ));
            }
            return Ok(element);
        }
    } else if element.data.len() == expected {
        return Ok(element);
    }

    Err(EncodeError::length(
        NAME,
        format!(
            "({}) requires {expected} characters, got {}",
            element.ai,
            element.data.len()
        ),
    ))
}

/// GS1-128: Code 128 carrying GS1 application identifiers.
///
/// Input is written in human-readable form, e.g.
/// `(01)09501101530003(10)ABC123`.
#[derive(Debug, Clone, Default)]
pub struct Gs1128 {
    style: SymbolStyle,
    start: Option<CodeSet>,
}

impl Gs1128 {
    pub const NAME: &'static str = "gs1128";

    pub fn new() -> Self {
        Self::default()
    }
}

impl BarcodeEncoder for Gs1128 {
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
        let elements = parse_elements(&text.to_string())?
            .into_iter()
            .map(normalise_element)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tokens = vec![Token::Fnc1];
        let mut caption = String::new();
        for (i, element) in elements.iter().enumerate() {
            tokens.extend(element.ai.bytes().map(Token::Byte));
            tokens.extend(element.data.bytes().map(Token::Byte));
            let last = i + 1 == elements.len();
            if !last && predefined_length(&element.ai).is_none() {
                tokens.push(Token::Fnc1);
            }
            caption.push_str(&format!("({}){}", element.ai, element.data));
        }

        let values = symbol_values(Self::NAME, &tokens, self.start)?;
        Ok(build_symbol(self.style.clone(), &values).with_caption(caption))
    }

    fn variant(&mut self) -> Variant<'_> {
        Variant::Sequential(self)
    }
}

impl StartSelect for Gs1128 {
    fn set_start(&mut self, start: Option<&str>) -> Result<(), ConfigError> {
        self.start = CodeSet::parse_start(start)?;
        Ok(())
    }
}
