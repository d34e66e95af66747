use serde::{Deserialize, Serialize};

use crate::dict::hex_int_from_string;
use crate::error::{PageError, Result};

/// RGB color for PDF graphics operations.
///
/// Each component is in the range 0.0 (none) to 1.0 (full intensity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Create a color from RGB components (each 0.0–1.0).
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Create a grayscale color (r = g = b = level).
    pub fn gray(level: f64) -> Self {
        Color {
            r: level,
            g: level,
            b: level,
        }
    }

    /// Build a color from a packed `0xRRGGBB` integer.
    pub fn from_hex_int(value: u32) -> Self {
        let channel = |shift: u32| ((value >> shift) & 0xFF) as f64 / 255.0;
        Color {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the `#RGB` shorthand.
    pub fn from_hex_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let expanded;
        let digits = if digits.len() == 3 {
            expanded = digits.chars().flat_map(|c| [c, c]).collect::<String>();
            expanded.as_str()
        } else {
            digits
        };
        if digits.len() != 6 {
            return Err(PageError::InvalidColor(s.to_string()));
        }
        hex_int_from_string(digits).map(Color::from_hex_int)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Page media box in PDF user space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MediaBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        MediaBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Lower-left and upper-right corners as written to `/MediaBox`.
    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

impl Default for MediaBox {
    fn default() -> Self {
        MediaBox::new(0.0, 0.0, 250.0, 500.0)
    }
}
