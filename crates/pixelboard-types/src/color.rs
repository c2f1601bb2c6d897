//! Canonical cell color.
//!
//! A [`Color`] is a 24-bit RGB value. The only accepted textual form is
//! `#` followed by exactly six hexadecimal digits; input is
//! case-insensitive and output is always uppercase (`#1A2B3C`). Because
//! construction goes through [`Color::parse`], a stored cell can never hold
//! anything other than a canonical color.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of hex digits after the leading `#`.
const HEX_DIGITS: usize = 6;

/// Errors produced when parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The value does not start with `#`.
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),

    /// The value does not have exactly six digits after `#`.
    #[error("color must have exactly 6 hex digits: {0:?}")]
    WrongLength(String),

    /// The value contains a character that is not a hex digit.
    #[error("color contains a non-hex digit: {0:?}")]
    NotHex(String),
}

/// A 24-bit RGB cell color with canonical `#RRGGBB` text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    /// Pure white, the color of an untouched cell.
    pub const WHITE: Self = Self(0x00FF_FFFF);

    /// Pure black.
    pub const BLACK: Self = Self(0);

    /// Parse a `#RRGGBB` string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns a [`ColorError`] describing why `input` is not a canonical
    /// color. Named colors (`"red"`), short forms (`"#FFF"`) and alpha
    /// forms (`"#FFFFFFFF"`) are all rejected.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let Some(digits) = input.strip_prefix('#') else {
            return Err(ColorError::MissingHash(input.to_owned()));
        };
        if digits.len() != HEX_DIGITS {
            return Err(ColorError::WrongLength(input.to_owned()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::NotHex(input.to_owned()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_parse| ColorError::NotHex(input.to_owned()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_canonicalizes_to_uppercase() {
        let color = Color::parse("#a1b2c3").unwrap();
        assert_eq!(color.to_string(), "#A1B2C3");
    }

    #[test]
    fn mixed_case_inputs_are_equal() {
        assert_eq!(Color::parse("#ff00AA").unwrap(), Color::parse("#FF00aa").unwrap());
    }

    #[test]
    fn rejects_named_colors() {
        assert!(matches!(Color::parse("red"), Err(ColorError::MissingHash(_))));
    }

    #[test]
    fn rejects_short_and_long_forms() {
        assert!(matches!(Color::parse("#12345"), Err(ColorError::WrongLength(_))));
        assert!(matches!(Color::parse("#FFF"), Err(ColorError::WrongLength(_))));
        assert!(matches!(Color::parse("#FFFFFFFF"), Err(ColorError::WrongLength(_))));
        assert!(matches!(Color::parse("#"), Err(ColorError::WrongLength(_))));
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert!(matches!(Color::parse("#GG0000"), Err(ColorError::NotHex(_))));
        assert!(matches!(Color::parse("#+12345"), Err(ColorError::NotHex(_))));
    }

    #[test]
    fn named_constants_render_canonically() {
        assert_eq!(Color::WHITE.to_string(), "#FFFFFF");
        assert_eq!(Color::BLACK.to_string(), "#000000");
    }

    #[test]
    fn serde_uses_canonical_string() {
        let color: Color = serde_json::from_str("\"#0000ff\"").unwrap();
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#0000FF\"");
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }
}
