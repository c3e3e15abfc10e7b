//! RGB/HSV colors and hex parsing

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected 7 characters in '#rrggbb' form, got {0:?}")]
    BadLength(String),
    #[error("missing leading '#' in {0:?}")]
    MissingHash(String),
    #[error("invalid hex digits in {0:?}")]
    BadDigits(String),
}

/// 24-bit color, also the `{r, g, b}` object of light commands
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Low 24 bits as `0xRRGGBB`
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Exactly six hex digits, no prefix
    pub fn from_hex_digits(digits: &str) -> Result<Self, ColorError> {
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigits(digits.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|_| ColorError::BadDigits(digits.to_string()))
    }

    /// Strict `#rrggbb`
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        if s.len() != 7 {
            return Err(ColorError::BadLength(s.to_string()));
        }
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
        Self::from_hex_digits(digits)
    }

    /// `#rrggbb` in lowercase
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.to_u32())
    }

    /// Multiply each channel by `scale / 256`, the way LED drivers dim
    pub const fn scale(self, scale: u8) -> Self {
        let s = scale as u16 + 1;
        Self {
            r: ((self.r as u16 * s) >> 8) as u8,
            g: ((self.g as u16 * s) >> 8) as u8,
            b: ((self.b as u16 * s) >> 8) as u8,
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Parse the leading hex digits of `s`, stopping at the first non-hex
/// character. Empty or non-hex input yields 0, overlong input keeps the
/// low 32 bits.
pub fn lenient_hex(s: &str) -> u32 {
    s.chars()
        .map_while(|c| c.to_digit(16))
        .fold(0u32, |acc, d| acc.wrapping_shl(4) | d)
}

/// 8-bit hue/saturation/value, hue wrapping over the full 0..=255 range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    pub fn to_rgb(self) -> Rgb {
        if self.s == 0 {
            return Rgb::new(self.v, self.v, self.v);
        }

        // Six sectors of ~43 hue steps each
        let sector = self.h / 43;
        let remainder = u16::from(self.h - sector * 43) * 6;

        let v = u16::from(self.v);
        let s = u16::from(self.s);
        let p = ((v * (255 - s)) >> 8) as u8;
        let q = ((v * (255 - ((s * remainder) >> 8))) >> 8) as u8;
        let t = ((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8) as u8;
        let v = self.v;

        match sector {
            0 => Rgb::new(v, t, p),
            1 => Rgb::new(q, v, p),
            2 => Rgb::new(p, v, t),
            3 => Rgb::new(p, q, v),
            4 => Rgb::new(t, p, v),
            _ => Rgb::new(v, p, q),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#ff8000"), Ok(Rgb::new(0xff, 0x80, 0x00)));
        assert_eq!(Rgb::from_hex("#00FFaa"), Ok(Rgb::new(0x00, 0xff, 0xaa)));
        assert!(matches!(Rgb::from_hex("ff8000"), Err(ColorError::BadLength(_))));
        assert!(matches!(Rgb::from_hex("xff8000"), Err(ColorError::MissingHash(_))));
        assert!(matches!(Rgb::from_hex("#ff80zz"), Err(ColorError::BadDigits(_))));
    }

    #[test]
    fn test_hex_roundtrip_is_lowercase() {
        assert_eq!(Rgb::from_hex("#ABCDEF").unwrap().to_hex(), "#abcdef");
    }

    #[test]
    fn test_lenient_hex() {
        assert_eq!(lenient_hex("ff0000"), 0xff0000);
        assert_eq!(lenient_hex("ff00zz"), 0xff00);
        assert_eq!(lenient_hex("zz"), 0);
        assert_eq!(lenient_hex(""), 0);
    }

    #[test]
    fn test_scale() {
        assert_eq!(Rgb::WHITE.scale(255), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.scale(0), Rgb::BLACK);
        assert_eq!(Rgb::new(200, 100, 50).scale(127), Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Hsv::new(0, 255, 255).to_rgb().r, 255);
        assert_eq!(Hsv::new(0, 0, 90).to_rgb(), Rgb::new(90, 90, 90));

        let green = Hsv::new(86, 255, 255).to_rgb();
        assert_eq!(green.g, 255);
        assert!(green.r < 10);

        let blue = Hsv::new(172, 255, 255).to_rgb();
        assert_eq!(blue.b, 255);
        assert!(blue.g < 10);
    }
}
