//! Check-digit algorithms shared by several symbologies.
//!
//! All functions take digit *values* (0-9), not ASCII bytes.

/// Modulo 10 with weights 3 and 1 alternating from the rightmost digit.
///
/// Used by GS1 keys and Interleaved/Standard 2 of 5.
pub(crate) fn mod10(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Luhn (modulo 10, doubling from the rightmost digit). Used by MSI.
pub(crate) fn luhn(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let d = u32::from(d);
            if i % 2 == 0 {
                let doubled = d * 2;
                doubled / 10 + doubled % 10
            } else {
                d
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Convert ASCII digits to values; `None` at the first non-digit.
pub(crate) fn digit_values(bytes: &[u8]) -> Option<Vec<u8>> {
    bytes
        .iter()
        .map(|&b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(s: &str) -> Vec<u8> {
        digit_values(s.as_bytes()).unwrap()
    }

    #[test]
    fn test_mod10_gs1() {
        assert_eq!(mod10(&values("0950110153000")), 3);
        // EAN-13 body of 4006381333931
        assert_eq!(mod10(&values("400638133393")), 1);
    }

    #[test]
    fn test_mod10_two_of_five() {
        assert_eq!(mod10(&values("1234567")), 0);
    }

    #[test]
    fn test_luhn() {
        assert_eq!(luhn(&values("1234567")), 4);
        assert_eq!(luhn(&values("7992739871")), 3);
    }

    #[test]
    fn test_digit_values_rejects_letters() {
        assert_eq!(digit_values(b"12a"), None);
        assert_eq!(digit_values(b""), Some(vec![]));
    }
}
