// THEORY:
// The `RegionDetector` is the engine of the spatial layer. Given a template and the
// dominant color chosen by the `ColorClusterer`, it finds where that color lives.
//
// Key architectural principles & algorithm steps:
// 1.  **Match Mask**: Every pixel is compared with the target color. A pixel matches
//     when its Euclidean RGB distance to the target is within the tolerance.
// 2.  **Extent Tracking**: Instead of storing the mask, the detector keeps the running
//     minimum and maximum coordinates of matching pixels, plus how many matched.
// 3.  **Single Bounding Box**: The result is the smallest rectangle enclosing every
//     match. Disjoint patches of the same color are NOT separated into components;
//     they are enclosed together. Oversized boxes produced this way are caught
//     downstream by coverage validation.
// 4.  **Stateless Utility**: Like the other detectors, it has no memory between calls.

use image::{GenericImageView, Rgba};

use crate::core_modules::color::{Color, Distance};
use crate::core_modules::region::{Point, Region};

/// Default match tolerance, in Euclidean RGB units (about 7% of black-to-white).
pub const DEFAULT_TOLERANCE: Distance = 30.0;

pub mod region_detector {
    use super::*;
    use crate::error::{RememeError, Result};
    use tracing::debug;

    /// Finds the bounding region of all pixels within `tolerance` of `target`.
    ///
    /// Fails with `RegionNotFound` when not a single pixel matches.
    pub fn detect_region<I>(image: &I, target: Color, tolerance: Distance) -> Result<Region>
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut matches: u64 = 0;

        for (x, y, pixel) in image.pixels() {
            if !target.is_within(&Color::from(pixel), tolerance) {
                continue;
            }
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            matches += 1;
        }

        if matches == 0 {
            debug!(color = %target, tolerance, "no matching pixels");
            return Err(RememeError::RegionNotFound {
                color: target,
                tolerance,
            });
        }

        let region = Region::from_corners(
            Point { x: min_x, y: min_y },
            Point { x: max_x, y: max_y },
            matches,
        );
        debug!(?region, color = %target, tolerance, "placeholder region detected");
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::region_detector::detect_region;
    use super::*;
    use crate::error::RememeError;
    use image::RgbaImage;

    const GRAY: Rgba<u8> = Rgba([90, 90, 90, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn template_with_square(x0: u32, y0: u32, side: u32) -> RgbaImage {
        RgbaImage::from_fn(100, 100, |x, y| {
            if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
                WHITE
            } else {
                GRAY
            }
        })
    }

    #[test]
    fn finds_the_white_square() {
        let image = template_with_square(30, 30, 40);
        let region = detect_region(&image, Color::WHITE, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(region, Region::new(30, 30, 40, 40, 1600));
    }

    #[test]
    fn near_colors_within_tolerance_match() {
        let mut image = template_with_square(10, 10, 5);
        image.put_pixel(50, 50, Rgba([240, 245, 250, 255]));
        let region = detect_region(&image, Color::WHITE, DEFAULT_TOLERANCE).unwrap();
        assert_eq!((region.x, region.y), (10, 10));
        assert_eq!((region.width, region.height), (41, 41));
        assert_eq!(region.pixel_count, 26);
    }

    #[test]
    fn disjoint_blobs_share_one_box() {
        let mut image = RgbaImage::from_pixel(20, 20, GRAY);
        image.put_pixel(2, 3, WHITE);
        image.put_pixel(17, 15, WHITE);
        let region = detect_region(&image, Color::WHITE, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(region, Region::new(2, 3, 16, 13, 2));
    }

    #[test]
    fn no_match_is_an_error() {
        let image = RgbaImage::from_pixel(8, 8, GRAY);
        let err = detect_region(&image, Color::WHITE, DEFAULT_TOLERANCE).unwrap_err();
        assert!(matches!(err, RememeError::RegionNotFound { color, .. } if color == Color::WHITE));
    }

    #[test]
    fn region_always_fits_the_image() {
        let image = RgbaImage::from_pixel(13, 7, WHITE);
        let region = detect_region(&image, Color::WHITE, 0.0).unwrap();
        assert_eq!(region, Region::new(0, 0, 13, 7, 91));
        assert!(region.fits_within(13, 7));
    }
}
