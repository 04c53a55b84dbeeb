use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// sRGB channels normalized to 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

/// Parse a 6-digit hex string (optional leading `#`, any case) to RGB channels (0-255).
/// Anything else is rejected: 3/8-digit shorthand, stray characters, a second `#`.
pub fn decode_rgb8(hex: &str) -> Result<[u8; 3]> {
    let raw = hex.strip_prefix('#').unwrap_or(hex);
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidColorFormat(hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&raw[i..i + 2], 16)
            .map_err(|_| Error::InvalidColorFormat(hex.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Parse a 6-digit hex string to normalized channels.
pub fn decode(hex: &str) -> Result<Rgb> {
    decode_rgb8(hex).map(Rgb::from_rgb8)
}

/// Canonical lowercase `#rrggbb` form of a valid hex color.
pub fn normalize(hex: &str) -> Result<String> {
    let [r, g, b] = decode_rgb8(hex)?;
    Ok(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

/// A validated color input: the canonical hex string plus its decoded channels.
#[derive(Debug, Clone, PartialEq)]
pub struct HexColor {
    hex: String,
    rgb: Rgb,
}

impl HexColor {
    pub fn parse(hex: &str) -> Result<Self> {
        Ok(Self {
            hex: normalize(hex)?,
            rgb: decode(hex)?,
        })
    }

    pub fn black() -> Self {
        Self {
            hex: "#000000".to_string(),
            rgb: Rgb { r: 0.0, g: 0.0, b: 0.0 },
        }
    }

    pub fn white() -> Self {
        Self {
            hex: "#ffffff".to_string(),
            rgb: Rgb { r: 1.0, g: 1.0, b: 1.0 },
        }
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }
}

impl FromStr for HexColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
