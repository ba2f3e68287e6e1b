// THEORY:
// The `Color` module is the most fundamental unit of the substitution engine. It is
// a "dumb" data container for a single RGB triple plus the one metric every other
// layer needs: the distance between two colors.
//
// Key principles:
// 1.  **Alpha is ignored**: Templates are matched on what is visible in RGB. The
//     alpha channel of a decoded pixel is dropped on conversion.
// 2.  **Exact equality, fuzzy closeness**: Two colors are equal only when every
//     channel is equal. "Close enough" is a separate question answered by
//     `distance` and a tolerance chosen by the caller.
// 3.  **Euclidean RGB**: Distance is the straight-line distance in the 0..255 RGB
//     cube. The largest possible distance (black to white) is about 441.67.

use std::fmt;

use image::{Rgb, Rgba};

pub type Channel = u8;
pub type Distance = f64;

/// A single RGB color, 0..255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
        Color { red, green, blue }
    }

    /// Squared Euclidean distance. Cheap, and monotonic with `distance`, so it is
    /// what the clustering hot loop compares on.
    pub fn distance_squared(&self, other: &Color) -> Distance {
        let dr = self.red as Distance - other.red as Distance;
        let dg = self.green as Distance - other.green as Distance;
        let db = self.blue as Distance - other.blue as Distance;
        dr * dr + dg * dg + db * db
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Color) -> Distance {
        self.distance_squared(other).sqrt()
    }

    /// True when `other` lies within `tolerance` of this color (inclusive).
    pub fn is_within(&self, other: &Color, tolerance: Distance) -> bool {
        self.distance(other) <= tolerance
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Color::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(pixel: Rgba<u8>) -> Self {
        Color::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<[u8; 3]> for Color {
    fn from(channels: [u8; 3]) -> Self {
        Color::new(channels[0], channels[1], channels[2])
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba([color.red, color.green, color.blue, 255])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_identical_colors() {
        let c = Color::new(12, 200, 77);
        assert_eq!(c.distance(&c), 0.0);
    }

    #[test]
    fn black_to_white_is_the_cube_diagonal() {
        let d = Color::BLACK.distance(&Color::WHITE);
        assert!((d - (3.0f64 * 255.0 * 255.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn tolerance_bound_is_inclusive() {
        let a = Color::new(0, 0, 0);
        let b = Color::new(3, 4, 0);
        assert!(a.is_within(&b, 5.0));
        assert!(!a.is_within(&b, 4.99));
    }

    #[test]
    fn alpha_is_dropped_on_conversion() {
        let c: Color = Rgba([1, 2, 3, 0]).into();
        assert_eq!(c, Color::new(1, 2, 3));
        let back: Rgba<u8> = c.into();
        assert_eq!(back, Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn display_reads_as_css_rgb() {
        assert_eq!(Color::WHITE.to_string(), "rgb(255, 255, 255)");
    }
}
