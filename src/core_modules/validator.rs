// THEORY:
// The `SubstitutionValidator` is the safety net for everything the detector cannot
// know. A placeholder that swallowed the whole template, or one made of a handful of
// stray pixels, is almost certainly wrong. Coverage, the share of the template taken
// up by the region, is a cheap proxy for "did we find the picture slot?".
//
// It works purely on recorded numbers. No pixels are re-read and nothing is
// re-detected.

use crate::core_modules::region::Region;

/// Share of the source area covered by `region`, in [0, 1].
///
/// An empty source has nothing to cover and reports zero.
pub fn coverage(region: &Region, source_width: u32, source_height: u32) -> f64 {
    let source_area = source_width as u64 * source_height as u64;
    if source_area == 0 {
        return 0.0;
    }
    (region.area() as f64 / source_area as f64).clamp(0.0, 1.0)
}

/// True iff `threshold_min <= coverage <= threshold_max`.
pub fn is_valid(
    region: &Region,
    source_width: u32,
    source_height: u32,
    threshold_min: f64,
    threshold_max: f64,
) -> bool {
    let coverage = coverage(region, source_width, source_height);
    threshold_min <= coverage && coverage <= threshold_max
}
