//! Serializable RGBA color with CSS-style hex parsing.

use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a hex color string (`#rgb`, `#rrggbb`, `#rrggbbaa`, or
    /// `transparent`). Malformed components fall back to 0.
    pub fn from_hex(color: &str) -> Self {
        if color == "transparent" {
            return Self::transparent();
        }

        if let Some(hex) = color.strip_prefix('#') {
            let hex = hex.trim();
            match hex.len() {
                3 => {
                    // #rgb -> #rrggbb
                    let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                    let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                    let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                    return Self::new(r, g, b, 255);
                }
                6 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                    return Self::new(r, g, b, 255);
                }
                8 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                    let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);
                    return Self::new(r, g, b, a);
                }
                _ => {}
            }
        }

        Self::black()
    }

    /// Format as `#rrggbb` (alpha omitted when opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Raw RGBA byte tuple.
    pub fn rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rrggbb() {
        let c = Color::from_hex("#111827");
        assert_eq!(c, Color::new(0x11, 0x18, 0x27, 255));
    }

    #[test]
    fn test_parse_short_form() {
        let c = Color::from_hex("#f0a");
        assert_eq!(c, Color::new(255, 0, 170, 255));
    }

    #[test]
    fn test_parse_with_alpha() {
        let c = Color::from_hex("#ff000080");
        assert_eq!(c, Color::new(255, 0, 0, 128));
    }

    #[test]
    fn test_parse_transparent() {
        assert_eq!(Color::from_hex("transparent"), Color::transparent());
    }

    #[test]
    fn test_parse_garbage_is_black() {
        assert_eq!(Color::from_hex("not-a-color"), Color::black());
        assert_eq!(Color::from_hex("#12345"), Color::black());
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Color::new(0x11, 0x18, 0x27, 255);
        assert_eq!(Color::from_hex(&c.to_hex()), c);

        let with_alpha = Color::new(10, 20, 30, 40);
        assert_eq!(Color::from_hex(&with_alpha.to_hex()), with_alpha);
    }
}
