//! RGBA colors with straight (non-premultiplied) float channels in `[0, 1]`

use crate::{RenderError, Result};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Straight-alpha color, every channel in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Create a color, channels are clamped into `[0, 1]` when blended
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channels clamped into `[0, 1]`, NaN treated as 0
    pub(crate) fn clamped(self) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::rgba(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }

    /// Whether drawing this color can change a pixel
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.clamped().a > 0.0
    }
}

impl FromStr for Color {
    type Err = RenderError;

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional)
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || RenderError::InvalidColor(s.to_string());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!("ffffff".parse::<Color>().unwrap(), Color::WHITE);

        let color: Color = "#ff000080".parse().unwrap();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.a - 128.0 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "#fff", "#gggggg", "#12345", "#1234567", "#ééé", "#+fffff"] {
            assert!(input.parse::<Color>().is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_visibility() {
        assert!(!Color::TRANSPARENT.is_visible());
        assert!(Color::BLACK.is_visible());
        assert!(!Color::BLACK.with_alpha(-1.0).is_visible());
        assert!(!Color::BLACK.with_alpha(f32::NAN).is_visible());
    }
}
