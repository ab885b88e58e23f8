//! Strict Roman numeral conversion.
//!
//! Heading numbers in ebook sources are marked up as Roman numerals; a marker
//! whose text is not a valid numeral is a hard error for that file, never a
//! silent zero.

use crate::error::{Error, Result};

const TOKENS: [(&str, u32); 13] = [
    ("M", 1000),
    ("CM", 900),
    ("D", 500),
    ("CD", 400),
    ("C", 100),
    ("XC", 90),
    ("L", 50),
    ("XL", 40),
    ("X", 10),
    ("IX", 9),
    ("V", 5),
    ("IV", 4),
    ("I", 1),
];

/// Parse a Roman numeral into its decimal value.
///
/// Case-insensitive. Only canonical numerals are accepted: the input must
/// round-trip through [`to_roman`], so forms like "IIII" or "VX" are rejected
/// with [`Error::MalformedRomanNumeral`].
pub fn from_roman(text: &str) -> Result<u32> {
    let upper = text.trim().to_uppercase();
    if upper.is_empty() {
        return Err(Error::MalformedRomanNumeral(text.to_string()));
    }

    let mut value = 0u32;
    let mut rest = upper.as_str();
    for (token, token_value) in TOKENS {
        while let Some(stripped) = rest.strip_prefix(token) {
            value += token_value;
            rest = stripped;
        }
    }
    if !rest.is_empty() || to_roman(value) != upper {
        return Err(Error::MalformedRomanNumeral(text.to_string()));
    }
    Ok(value)
}

/// Format a decimal value as an uppercase Roman numeral.
///
/// Returns an empty string for 0, which has no Roman representation.
pub fn to_roman(mut value: u32) -> String {
    let mut out = String::new();
    for (token, token_value) in TOKENS {
        while value >= token_value {
            out.push_str(token);
            value -= token_value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_values() {
        assert_eq!(from_roman("I").unwrap(), 1);
        assert_eq!(from_roman("IV").unwrap(), 4);
        assert_eq!(from_roman("XIV").unwrap(), 14);
        assert_eq!(from_roman("XLII").unwrap(), 42);
        assert_eq!(from_roman("MCMXCIX").unwrap(), 1999);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(from_roman("xiv").unwrap(), 14);
        assert_eq!(from_roman("McmXCix").unwrap(), 1999);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(from_roman("  VII\n").unwrap(), 7);
    }

    #[test]
    fn test_malformed_rejected() {
        for bad in ["", "  ", "ABC", "IIII", "VX", "IC", "XIVV", "1", "X IV"] {
            assert!(
                matches!(from_roman(bad), Err(Error::MalformedRomanNumeral(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_round_trip() {
        for n in 1..=2000 {
            assert_eq!(from_roman(&to_roman(n)).unwrap(), n);
        }
    }
}
