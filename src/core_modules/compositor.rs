// THEORY:
// The `Compositor` is the final, output-producing stage. It takes the detected
// placeholder and pastes the substitute image over it.
//
// Key principles:
// 1.  **Stretch to Fit**: Unless the caller asks for an explicit size, the substitute
//     is resized to exactly the region's width and height. Aspect ratio is not kept;
//     the placeholder's shape wins.
// 2.  **Hard Overlay**: Substitute pixels replace template pixels one for one. There
//     is no alpha blending and no feathering at the edges.
// 3.  **Copy, Never Mutate**: The template and the substitute are borrowed read-only;
//     a fresh image is returned. Everything outside the placement is byte-identical
//     to the template.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView};

use crate::core_modules::region::{Point, Region};

/// The rectangle the substitute occupies once pasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub origin: Point,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            origin: Point { x, y },
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when nothing would be clipped on an image of the given dimensions.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.origin.x as u64 + self.width as u64 <= image_width as u64
            && self.origin.y as u64 + self.height as u64 <= image_height as u64
    }
}

/// The rectangle the substitute will occupy: the region's origin, with the explicit
/// size when one is given and the region's own size otherwise.
pub fn placement(region: &Region, resize_to: Option<(u32, u32)>) -> Placement {
    let (width, height) = resize_to.unwrap_or_else(|| region.size());
    Placement {
        origin: region.top_left(),
        width,
        height,
    }
}

/// Pastes `substitute`, resized with `filter`, over `source` at `region`.
///
/// Any part of an explicitly sized substitute that falls outside the template is
/// clipped.
pub fn composite(
    source: &DynamicImage,
    region: &Region,
    substitute: &DynamicImage,
    resize_to: Option<(u32, u32)>,
    filter: FilterType,
) -> DynamicImage {
    let target = placement(region, resize_to);
    let mut canvas = source.to_rgba8();

    let resized = if substitute.dimensions() == target.size() {
        substitute.to_rgba8()
    } else {
        imageops::resize(substitute, target.width, target.height, filter)
    };

    imageops::replace(&mut canvas, &resized, target.origin.x as i64, target.origin.y as i64);
    DynamicImage::ImageRgba8(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn solid(width: u32, height: u32, pixel: Rgba<u8>) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, pixel))
    }

    #[test]
    fn placement_defaults_to_the_region_size() {
        let region = Region::new(3, 4, 10, 20, 150);
        assert_eq!(placement(&region, None), Placement::new(3, 4, 10, 20));
        assert_eq!(placement(&region, Some((5, 6))), Placement::new(3, 4, 5, 6));
    }

    #[test]
    fn placement_reports_clipping() {
        let region = Region::new(15, 15, 2, 2, 4);
        assert!(placement(&region, None).fits_within(20, 20));
        assert!(placement(&region, Some((5, 5))).fits_within(20, 20));
        assert!(!placement(&region, Some((6, 5))).fits_within(20, 20));
    }

    #[test]
    fn substitute_is_stretched_into_the_region() {
        let source = solid(100, 100, BLUE);
        let substitute = solid(10, 10, RED);
        let region = Region::new(30, 30, 40, 40, 1600);

        let output = composite(&source, &region, &substitute, None, FilterType::CatmullRom);

        assert_eq!(output.dimensions(), (100, 100));
        for (x, y, pixel) in output.pixels() {
            let expected = if region.contains(x, y) { RED } else { BLUE };
            assert_eq!(pixel, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn explicit_size_overflowing_the_template_is_clipped() {
        let source = solid(20, 20, BLUE);
        let substitute = solid(4, 4, RED);
        let region = Region::new(15, 15, 2, 2, 4);

        let output = composite(&source, &region, &substitute, Some((10, 10)), FilterType::Nearest);

        assert_eq!(output.dimensions(), (20, 20));
        assert_eq!(output.get_pixel(19, 19), RED);
        assert_eq!(output.get_pixel(14, 14), BLUE);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let source = solid(8, 8, BLUE);
        let substitute = solid(2, 2, RED);
        let before = source.clone();

        let _ = composite(&source, &Region::new(0, 0, 8, 8, 64), &substitute, None, FilterType::Triangle);

        assert_eq!(source, before);
        assert_eq!(substitute.get_pixel(0, 0), RED);
    }
}
