// THEORY:
// The `Region` module describes where the placeholder lives inside a template. A
// `Region` is the output of the detection layer and the input of both the
// compositing layer and the validation layer.
//
// Key architectural principles:
// 1.  **Bounding Box, not Mask**: The substitute is pasted as a rectangle, so any
//     precision beyond the enclosing rectangle buys nothing at compositing time.
// 2.  **Stateless Data Container**: A `Region` is created fresh for every
//     substitution and never changes afterwards. It has no memory of earlier
//     templates.
// 3.  **Two Notions of Size**: `area` is the rectangle's pixel area and drives
//     coverage validation. `pixel_count` is how many pixels actually matched the
//     dominant color. The two differ whenever the match is not a solid rectangle.

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// An axis-aligned rectangle inside a source image, plus how many pixels matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left edge, inclusive.
    pub x: u32,
    /// Top edge, inclusive.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Number of matching pixels inside the box.
    pub pixel_count: u64,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32, pixel_count: u64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            pixel_count,
        }
    }

    /// Builds the region spanned by two inclusive corners.
    pub fn from_corners(top_left: Point, bottom_right: Point, pixel_count: u64) -> Self {
        Self::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x + 1,
            bottom_right.y - top_left.y + 1,
            pixel_count,
        )
    }

    pub fn top_left(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel area of the bounding box.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the whole box lies within an image of the given dimensions.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.x as u64 + self.width as u64 <= image_width as u64
            && self.y as u64 + self.height as u64 <= image_height as u64
    }

    /// True when the point falls inside the box.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && (x as u64) < self.x as u64 + self.width as u64
            && (y as u64) < self.y as u64 + self.height as u64
    }
}
