//! Colours for text fills and the canvas background.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{SceneError, SceneResult};

/// An 8-bit straight-alpha RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Opaque green (CSS `green`, not `lime`).
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    /// CSS `plum`, the default canvas fill.
    pub const PLUM: Self = Self::rgb(221, 160, 221);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a colour with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Look up one of the supported CSS colour names.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "red" => Some(Self::RED),
            "blue" => Some(Self::BLUE),
            "green" => Some(Self::GREEN),
            "plum" => Some(Self::PLUM),
            "transparent" => Some(Self::TRANSPARENT),
            _ => None,
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a well-formed hex colour.
    pub fn from_hex(hex: &str) -> SceneResult<Self> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.is_ascii())
            .ok_or_else(|| SceneError::InvalidColor(hex.to_string()))?;
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| SceneError::InvalidColor(hex.to_string()))
        };

        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..=i].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(SceneError::InvalidColor(hex.to_string())),
        }
    }

    /// Whether the colour is fully opaque.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Alpha as a 0.0..=1.0 opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Channels as an array.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            Self::from_hex(trimmed)
        } else {
            Self::named(trimmed).ok_or_else(|| SceneError::InvalidColor(s.to_string()))
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// The fixed text colour choices offered by the editor.
pub struct Palette;

impl Palette {
    /// Swatches in display order.
    pub const SWATCHES: [(&'static str, Color); 5] = [
        ("white", Color::WHITE),
        ("black", Color::BLACK),
        ("red", Color::RED),
        ("blue", Color::BLUE),
        ("green", Color::GREEN),
    ];

    /// Look up a swatch by name.
    #[must_use]
    pub fn swatch(name: &str) -> Option<Color> {
        Self::SWATCHES
            .iter()
            .find(|(swatch, _)| swatch.eq_ignore_ascii_case(name))
            .map(|(_, color)| *color)
    }
}
