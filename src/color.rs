//! Hex color parsing and formatting for rule configuration.
//!
//! Rule colors arrive as CSS-style hex strings. Two forms are accepted,
//! with or without the leading `#` and in any letter case:
//!
//! - `#RGB` - 3-digit shorthand, each digit is doubled (`#0AF` -> `#00AAFF`)
//! - `#RRGGBB` - 6-digit hex
//!
//! Anything else is rejected with a [`ColorError`].

use std::str::FromStr;

use palette::Srgb;
use thiserror::Error;

/// An 8-bit-per-channel sRGB color.
pub type Rgb = Srgb<u8>;

/// Error type for hex color parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty (or only a `#`).
    #[error("empty color string")]
    Empty,
    /// Invalid digit count (must be 3 or 6 hex digits).
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains a non-hex character.
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// Rejected by the underlying hex decoder.
    #[error("malformed hex color: {0}")]
    Malformed(String),
}

/// Parses a `#RGB` or `#RRGGBB` hex string into a color.
///
/// # Examples
///
/// ```
/// use tile_transpose::color::{Rgb, parse_hex};
///
/// assert_eq!(parse_hex("#0AF").unwrap(), Rgb::new(0x00, 0xaa, 0xff));
/// assert_eq!(parse_hex("00aaff").unwrap(), Rgb::new(0x00, 0xaa, 0xff));
/// assert!(parse_hex("#00aaf").is_err());
/// ```
pub fn parse_hex(s: &str) -> Result<Rgb, ColorError> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.is_empty() {
        return Err(ColorError::Empty);
    }

    // palette slices by byte offset, so everything must be ASCII hex first
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    match hex.len() {
        3 | 6 => Rgb::from_str(hex).map_err(|e| ColorError::Malformed(e.to_string())),
        len => Err(ColorError::InvalidLength(len)),
    }
}

/// Parses a hex string, returning `None` for anything malformed.
pub fn hex_to_rgb(s: &str) -> Option<Rgb> {
    parse_hex(s).ok()
}

/// Formats a color as lowercase `#rrggbb`.
pub fn to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let color = parse_hex("#1a2B3c").unwrap();
        assert_eq!((color.red, color.green, color.blue), (0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn shorthand_expands_each_digit() {
        assert_eq!(parse_hex("#0AF").unwrap(), parse_hex("#00AAFF").unwrap());
        assert_eq!(parse_hex("#fff").unwrap(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn leading_hash_is_optional() {
        assert_eq!(parse_hex("000000").unwrap(), Rgb::new(0, 0, 0));
        assert_eq!(parse_hex("abc").unwrap(), parse_hex("#abc").unwrap());
    }

    #[test]
    fn hex_roundtrip_is_lowercase() {
        for input in ["#000000", "#0000ff", "#FFFFFF", "#12aB9f", "#808080"] {
            assert_eq!(to_hex(parse_hex(input).unwrap()), input.to_lowercase());
        }
    }

    #[test]
    fn rejects_bad_lengths() {
        assert_eq!(parse_hex("#12"), Err(ColorError::InvalidLength(2)));
        assert_eq!(parse_hex("#1234"), Err(ColorError::InvalidLength(4)));
        assert_eq!(parse_hex("#1234567"), Err(ColorError::InvalidLength(7)));
    }

    #[test]
    fn rejects_non_hex() {
        assert_eq!(parse_hex("#00gg00"), Err(ColorError::InvalidHex('g')));
        assert_eq!(parse_hex("#+f0f0f"), Err(ColorError::InvalidHex('+')));
        assert_eq!(parse_hex("blue"), Err(ColorError::InvalidHex('l')));
        assert!(matches!(parse_hex("#ééé"), Err(ColorError::InvalidHex('é'))));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(parse_hex(""), Err(ColorError::Empty));
        assert_eq!(parse_hex("#"), Err(ColorError::Empty));
    }

    #[test]
    fn hex_to_rgb_nulls_out_failures() {
        assert!(hex_to_rgb("not a color").is_none());
        assert_eq!(hex_to_rgb("#00f"), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn hex_words_are_colors() {
        assert_eq!(parse_hex("bad"), Ok(Rgb::new(0xbb, 0xaa, 0xdd)));
        assert_eq!(parse_hex("#C0FFEE"), Ok(Rgb::new(0xc0, 0xff, 0xee)));
    }
}
