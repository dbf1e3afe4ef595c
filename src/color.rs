//! Highlight colors and their textual forms.
//!
//! Colors are written as `#rrggbb`, as named colors, or as `[r, g, b]` float
//! arrays in the 0..1 range.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_color(&value).ok_or_else(|| format!("unrecognized color '{}'", value))
    }
}

/// Parse a color string (named, `#rrggbb`, or `[r,g,b]` with 0..1 components).
pub fn parse_color(val: &str) -> Option<Rgb> {
    let val = val.trim();
    if val.starts_with('[') && val.ends_with(']') {
        // e.g. [1.0, 0.411765, 0.380392]
        let inner = &val[1..val.len() - 1];
        let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
        if parts.len() != 3 {
            return None;
        }
        let mut rgb = [0u8; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            let v = part.parse::<f32>().ok()?;
            *slot = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        Some(Rgb::new(rgb[0], rgb[1], rgb[2]))
    } else if let Some(hex) = val.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb::new(r, g, b))
    } else {
        let named = match val.to_ascii_lowercase().as_str() {
            "white" => Rgb::new(0xff, 0xff, 0xff),
            "black" => Rgb::new(0x00, 0x00, 0x00),
            "red" => Rgb::new(0xff, 0x00, 0x00),
            "green" | "lime" => Rgb::new(0x00, 0xff, 0x00),
            "blue" => Rgb::new(0x00, 0x00, 0xff),
            "yellow" => Rgb::new(0xff, 0xff, 0x00),
            "orange" => Rgb::new(0xff, 0xa5, 0x00),
            "cyan" => Rgb::new(0x00, 0xff, 0xff),
            "magenta" => Rgb::new(0xff, 0x00, 0xff),
            "lightblue" => Rgb::new(0xad, 0xd8, 0xe6),
            "darkgreen" => Rgb::new(0x00, 0x64, 0x00),
            "gray" | "grey" => Rgb::new(0x80, 0x80, 0x80),
            "brown" => Rgb::new(0xa5, 0x2a, 0x2a),
            "purple" => Rgb::new(0x80, 0x00, 0x80),
            "pink" => Rgb::new(0xff, 0xc0, 0xcb),
            "navy" => Rgb::new(0x00, 0x00, 0x80),
            "teal" => Rgb::new(0x00, 0x80, 0x80),
            "olive" => Rgb::new(0x80, 0x80, 0x00),
            "maroon" => Rgb::new(0x80, 0x00, 0x00),
            _ => return None,
        };
        Some(named)
    }
}

/// The three colors the engine paints with, one per highlight purpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPalette {
    /// Atoms covered by a substructure filter fragment.
    pub filter_match: Rgb,
    /// Atoms in the common part with a similarity filter reference.
    pub similarity_match: Rgb,
    /// Current-row comparison (differencing mode). Handed to the colorizer for
    /// hosts that paint the comparison themselves; the bundled
    /// `McsDiffColorizer` marks differences through bond flags and grafted
    /// atoms only and never paints this color.
    pub reference_compare: Rgb,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            filter_match: Rgb::new(0xd0, 0x20, 0x20),
            similarity_match: Rgb::new(0x20, 0x60, 0xd0),
            reference_compare: Rgb::new(0x20, 0xa0, 0x40),
        }
    }
}
