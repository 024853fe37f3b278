//! Style lookup seam
//!
//! The scheduling core owns no theme state. Parser output carries
//! tree-sitter capture names ("keyword", "string.special", …) and the host
//! resolves them to concrete styles through a narrow [`StyleProvider`] at
//! apply time, instead of a global theme singleton.

use serde::Deserialize;

use crate::events::TextRange;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        match s.len() {
            6 => Ok(Color {
                r: u8::from_str_radix(&s[0..2], 16).map_err(|e| e.to_string())?,
                g: u8::from_str_radix(&s[2..4], 16).map_err(|e| e.to_string())?,
                b: u8::from_str_radix(&s[4..6], 16).map_err(|e| e.to_string())?,
                a: 255,
            }),
            8 => Ok(Color {
                r: u8::from_str_radix(&s[0..2], 16).map_err(|e| e.to_string())?,
                g: u8::from_str_radix(&s[2..4], 16).map_err(|e| e.to_string())?,
                b: u8::from_str_radix(&s[4..6], 16).map_err(|e| e.to_string())?,
                a: u8::from_str_radix(&s[6..8], 16).map_err(|e| e.to_string())?,
            }),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Text attributes applied to a highlighted span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Style {
    /// Foreground color; `None` inherits the editor foreground
    #[serde(default)]
    pub foreground: Option<Color>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// A span of parser output: a range plus the capture name that matched it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub range: TextRange,
    /// Tree-sitter capture name, e.g. "keyword" or "string.special"
    pub capture: String,
}

impl HighlightSpan {
    pub fn new(range: TextRange, capture: impl Into<String>) -> Self {
        Self {
            range,
            capture: capture.into(),
        }
    }
}

/// A resolved span handed to the text storage, ordered by range start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyledSpan {
    pub range: TextRange,
    pub style: Style,
}

/// Narrow theme lookup injected into the coordinator
///
/// Returning `None` means the capture has no style in the active theme;
/// the span is skipped rather than styled with a fallback.
pub trait StyleProvider {
    fn style_for(&self, capture: &str) -> Option<Style>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        let color = Color::from_hex("#ff8000").unwrap();
        assert_eq!(color, Color::rgb(255, 128, 0));
    }

    #[test]
    fn test_from_hex_rgba() {
        let color = Color::from_hex("#ff800080").unwrap();
        assert_eq!(color, Color::rgba(255, 128, 0, 128));
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_style_deserializes_from_yaml() {
        let style: Style = serde_yaml::from_str("foreground: \"#c678dd\"\nbold: true").unwrap();
        assert_eq!(style.foreground, Some(Color::rgb(0xc6, 0x78, 0xdd)));
        assert!(style.bold);
        assert!(!style.italic);
    }
}
