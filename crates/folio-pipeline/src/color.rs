//! Plain hex colors and detection of CSS color functions the
//! screenshot capability cannot parse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CSS color functions the rasterizer does not understand.
///
/// Matched case-insensitively against computed style values.  `lab(`
/// also matches inside `oklab(`, which is intended.
pub const UNSUPPORTED_COLOR_FUNCTIONS: &[&str] = &[
    "oklch(",
    "oklab(",
    "lch(",
    "lab(",
    "hwb(",
    "color(",
    "color-mix(",
];

/// Returns `true` if a computed CSS color value uses a color function
/// from [`UNSUPPORTED_COLOR_FUNCTIONS`].
#[must_use]
pub fn uses_unsupported_color_function(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    UNSUPPORTED_COLOR_FUNCTIONS
        .iter()
        .any(|function| value.contains(function))
}

/// Errors produced when parsing a CSS hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The value does not start with `#`.
    #[error("not a hex color: {0:?}")]
    NotHex(String),

    /// A character after `#` is not a hex digit.
    #[error("invalid hex color: {0:?}")]
    InvalidDigit(String),

    /// The value has neither 3 nor 6 hex digits.
    #[error("unexpected hex length: {0:?}")]
    Length(String),
}

/// An opaque sRGB color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// `#ffffff`
    pub const WHITE: Self = Self::from_u32(0x00ff_ffff);

    /// Build a color from a `0xRRGGBB` literal.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_u32(value: u32) -> Self {
        Self([(value >> 16) as u8, (value >> 8) as u8, value as u8])
    }

    /// The color as a fully opaque RGBA pixel.
    #[must_use]
    pub const fn to_rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    /// Parse `"#1a1a1a"` or `" #fff "` (short form expands per digit).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::NotHex(s.to_owned()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(s.to_owned()));
        }
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, ch) in rgb.iter_mut().zip(hex.chars()) {
                    let n = ch
                        .to_digit(16)
                        .ok_or_else(|| ColorError::InvalidDigit(s.to_owned()))?;
                    #[expect(clippy::cast_possible_truncation)]
                    {
                        *slot = (n * 17) as u8;
                    }
                }
                Ok(Self(rgb))
            }
            6 => {
                let channel = |range: std::ops::Range<usize>| {
                    u8::from_str_radix(&hex[range], 16)
                        .map_err(|_| ColorError::InvalidDigit(s.to_owned()))
                };
                Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
            }
            _ => Err(ColorError::Length(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detects_modern_color_functions() {
        assert!(uses_unsupported_color_function("oklch(0.62 0.19 259.8)"));
        assert!(uses_unsupported_color_function("OKLAB(0.5 0.1 0.1)"));
        assert!(uses_unsupported_color_function("lab(52% 40 59)"));
        assert!(uses_unsupported_color_function(
            "color-mix(in srgb, red 50%, blue)"
        ));
        assert!(uses_unsupported_color_function("color(display-p3 1 0 0)"));
    }

    #[test]
    fn accepts_legacy_color_syntax() {
        assert!(!uses_unsupported_color_function("rgb(17, 24, 39)"));
        assert!(!uses_unsupported_color_function("rgba(0, 0, 0, 0)"));
        assert!(!uses_unsupported_color_function("hsl(210 40% 96%)"));
        assert!(!uses_unsupported_color_function("#111827"));
        assert!(!uses_unsupported_color_function("transparent"));
        assert!(!uses_unsupported_color_function(""));
    }

    #[test]
    fn parse_six_digit_hex() {
        assert_eq!("#1f2937".parse::<Rgb>().unwrap(), Rgb([0x1f, 0x29, 0x37]));
        assert_eq!(" #FFFFFF ".parse::<Rgb>().unwrap(), Rgb::WHITE);
    }

    #[test]
    fn parse_short_hex_expands_digits() {
        assert_eq!("#fa0".parse::<Rgb>().unwrap(), Rgb([0xff, 0xaa, 0x00]));
    }

    #[test]
    fn parse_rejects_malformed_values() {
        assert!(matches!("111827".parse::<Rgb>(), Err(ColorError::NotHex(_))));
        assert!(matches!(
            "#11182g".parse::<Rgb>(),
            Err(ColorError::InvalidDigit(_))
        ));
        assert!(matches!("#1118".parse::<Rgb>(), Err(ColorError::Length(_))));
        // Multi-byte characters must not panic on slicing.
        assert!("#ééé".parse::<Rgb>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb::from_u32(0x0025_63eb).to_string(), "#2563eb");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgb::from_u32(0x0011_1827)).unwrap();
        assert_eq!(json, "\"#111827\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::from_u32(0x0011_1827));
        assert!(serde_json::from_str::<Rgb>("\"red\"").is_err());
    }

    #[test]
    fn to_rgba_is_opaque() {
        assert_eq!(Rgb::WHITE.to_rgba(), image::Rgba([255, 255, 255, 255]));
    }
}
