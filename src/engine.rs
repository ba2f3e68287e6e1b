// THEORY:
// The `engine` module is the final, top-level API for the substitution system. It
// wires the leaf modules into a single, easy-to-use interface:
//
//   template ─► ColorClusterer ─► RegionDetector ─► Compositor ─► output
//                                       │
//                                       └─► SubstitutionRecord ─► Validator
//
// Key architectural principles:
// 1.  **Single-Slot Memory**: The engine remembers exactly one thing, the last
//     successful substitution. It is an explicit `Option`, so the engine is either
//     empty or holds a result. A failed `substitute` leaves the slot as it was.
// 2.  **Fail Fast**: Parameters are checked before any image is loaded or decoded.
// 3.  **Foolproof Sweep**: `substitute_until_valid` walks cluster counts in ascending
//     order (white first, then progressively finer clustering) and returns the first
//     result that validates. Only "no region found" is recoverable inside the sweep;
//     every other error stops it.
// 4.  **Codec Seam**: Images are loaded through an `ImageCodec`, so the engine can be
//     driven from disk in production and from memory in tests.

use std::ops::Range;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::core_modules::color::{Color, Distance};
use crate::core_modules::color_clusterer::{
    self, ClusterOptions, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_SAMPLES,
};
use crate::core_modules::compositor::{self, Placement};
use crate::core_modules::region::Region;
use crate::core_modules::region_detector::{DEFAULT_TOLERANCE, region_detector};
use crate::core_modules::utils::image_helper::{FileCodec, ImageCodec};
use crate::core_modules::validator;
use crate::error::{RememeError, Result};

pub const DEFAULT_CLUSTER_AMOUNT: usize = 3;
pub const DEFAULT_THRESHOLD_MIN: f64 = 0.1;
pub const DEFAULT_THRESHOLD_MAX: f64 = 0.9;
pub const DEFAULT_CLUSTER_RANGE: Range<usize> = 0..6;

/// Configuration for the SubstitutionEngine, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionConfig {
    /// Maximum Euclidean RGB distance for a pixel to count as the dominant color.
    pub tolerance: Distance,
    /// Cap on k-means refinement passes.
    pub max_iterations: usize,
    /// Cap on how many pixels are sampled for clustering.
    pub max_samples: usize,
    /// Lower coverage bound used by `substitute_until_valid`.
    pub threshold_min: f64,
    /// Upper coverage bound used by `substitute_until_valid`.
    pub threshold_max: f64,
    /// Filter used when resizing the substitute into place.
    pub resize_filter: FilterType,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_samples: DEFAULT_MAX_SAMPLES,
            threshold_min: DEFAULT_THRESHOLD_MIN,
            threshold_max: DEFAULT_THRESHOLD_MAX,
            resize_filter: FilterType::CatmullRom,
        }
    }
}

impl SubstitutionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(RememeError::InvalidParameter(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        check_thresholds(self.threshold_min, self.threshold_max)
    }

    fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            max_iterations: self.max_iterations,
            max_samples: self.max_samples,
        }
    }
}

/// What the engine remembers about its last successful substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionRecord {
    /// The color the placeholder was detected by.
    pub dominant_color: Color,
    /// The detected placeholder.
    pub region: Region,
    /// Where the substitute was pasted. Matches `region` unless an explicit size
    /// was requested.
    pub placement: Placement,
    pub source_width: u32,
    pub source_height: u32,
}

impl SubstitutionRecord {
    pub fn source_area(&self) -> u64 {
        self.source_width as u64 * self.source_height as u64
    }

    /// Share of the template covered by the detected region.
    pub fn coverage(&self) -> f64 {
        validator::coverage(&self.region, self.source_width, self.source_height)
    }

    /// False when an explicitly sized substitute was clipped at the template edge.
    pub fn placement_fits(&self) -> bool {
        self.placement.fits_within(self.source_width, self.source_height)
    }
}

/// The main, top-level struct for the substitution engine.
pub struct SubstitutionEngine<C: ImageCodec = FileCodec> {
    codec: C,
    config: SubstitutionConfig,
    last_substitution: Option<SubstitutionRecord>,
}

impl SubstitutionEngine<FileCodec> {
    /// An engine reading images from the filesystem.
    pub fn new(config: SubstitutionConfig) -> Result<Self> {
        Self::with_codec(FileCodec, config)
    }
}

impl Default for SubstitutionEngine<FileCodec> {
    fn default() -> Self {
        Self {
            codec: FileCodec,
            config: SubstitutionConfig::default(),
            last_substitution: None,
        }
    }
}

impl<C: ImageCodec> SubstitutionEngine<C> {
    pub fn with_codec(codec: C, config: SubstitutionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codec,
            config,
            last_substitution: None,
        })
    }

    pub fn config(&self) -> &SubstitutionConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn last_substitution(&self) -> Option<&SubstitutionRecord> {
        self.last_substitution.as_ref()
    }

    /// Replaces the dominant-colored placeholder of the template at `source_path`
    /// with the image at `substitute_path`.
    ///
    /// `dominant_cluster_amount == 0` assumes a white placeholder. `resize_to`
    /// overrides the pasted size; by default the substitute is stretched to the
    /// detected region.
    pub fn substitute(
        &mut self,
        source_path: impl AsRef<Path>,
        substitute_path: impl AsRef<Path>,
        dominant_cluster_amount: usize,
        resize_to: Option<(u32, u32)>,
    ) -> Result<DynamicImage> {
        check_resize_to(resize_to)?;
        let source = self.codec.load(source_path.as_ref())?;
        let substitute = self.codec.load(substitute_path.as_ref())?;
        self.substitute_image(&source, &substitute, dominant_cluster_amount, resize_to)
    }

    /// Same as `substitute`, for images that are already decoded.
    pub fn substitute_image(
        &mut self,
        source: &DynamicImage,
        substitute: &DynamicImage,
        dominant_cluster_amount: usize,
        resize_to: Option<(u32, u32)>,
    ) -> Result<DynamicImage> {
        check_resize_to(resize_to)?;

        // Stage 1: Dominant Color
        let dominant_color = color_clusterer::dominant_color(
            source,
            dominant_cluster_amount,
            &self.config.cluster_options(),
        );

        // Stage 2: Placeholder Detection
        let region = region_detector::detect_region(source, dominant_color, self.config.tolerance)?;

        // Stage 3: Compositing
        let output = compositor::composite(
            source,
            &region,
            substitute,
            resize_to,
            self.config.resize_filter,
        );

        let (source_width, source_height) = source.dimensions();
        let record = SubstitutionRecord {
            dominant_color,
            region,
            placement: compositor::placement(&region, resize_to),
            source_width,
            source_height,
        };
        debug!(
            clusters = dominant_cluster_amount,
            color = %dominant_color,
            ?region,
            coverage = record.coverage(),
            "substitution complete"
        );
        self.last_substitution = Some(record);

        Ok(output)
    }

    /// Checks the last substitution's coverage against `[threshold_min, threshold_max]`.
    pub fn validate_last_substitution(&self, threshold_min: f64, threshold_max: f64) -> Result<bool> {
        check_thresholds(threshold_min, threshold_max)?;
        let record = self
            .last_substitution
            .as_ref()
            .ok_or(RememeError::NoPriorSubstitution)?;

        Ok(validator::is_valid(
            &record.region,
            record.source_width,
            record.source_height,
            threshold_min,
            threshold_max,
        ))
    }

    /// Tries every cluster amount in `cluster_range`, ascending, and returns the first
    /// output that validates against the configured thresholds. `None` when the
    /// range runs out without a valid result.
    pub fn substitute_until_valid(
        &mut self,
        source_path: impl AsRef<Path>,
        substitute_path: impl AsRef<Path>,
        cluster_range: Range<usize>,
    ) -> Result<Option<DynamicImage>> {
        if cluster_range.start > cluster_range.end {
            return Err(RememeError::InvalidParameter(format!(
                "cluster range start {} is past its end {}",
                cluster_range.start, cluster_range.end
            )));
        }
        let source = self.codec.load(source_path.as_ref())?;
        let substitute = self.codec.load(substitute_path.as_ref())?;
        let (threshold_min, threshold_max) = (self.config.threshold_min, self.config.threshold_max);

        for cluster_amount in cluster_range.clone() {
            let output = match self.substitute_image(&source, &substitute, cluster_amount, None) {
                Ok(output) => output,
                Err(RememeError::RegionNotFound { color, .. }) => {
                    debug!(clusters = cluster_amount, %color, "no region, trying next cluster amount");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.validate_last_substitution(threshold_min, threshold_max)? {
                info!(clusters = cluster_amount, "valid substitution found");
                return Ok(Some(output));
            }
            debug!(clusters = cluster_amount, "substitution rejected by coverage check");
        }

        info!(
            start = cluster_range.start,
            end = cluster_range.end,
            "no valid substitution in cluster range"
        );
        Ok(None)
    }
}

fn check_resize_to(resize_to: Option<(u32, u32)>) -> Result<()> {
    match resize_to {
        Some((width, height)) if width == 0 || height == 0 => Err(RememeError::InvalidParameter(
            format!("resize_to must be positive, got {width}x{height}"),
        )),
        _ => Ok(()),
    }
}

fn check_thresholds(threshold_min: f64, threshold_max: f64) -> Result<()> {
    let in_unit = |t: f64| (0.0..=1.0).contains(&t);
    if !in_unit(threshold_min) || !in_unit(threshold_max) {
        return Err(RememeError::InvalidParameter(format!(
            "thresholds must lie in [0, 1], got {threshold_min} and {threshold_max}"
        )));
    }
    if threshold_min > threshold_max {
        return Err(RememeError::InvalidParameter(format!(
            "threshold_min {threshold_min} exceeds threshold_max {threshold_max}"
        )));
    }
    Ok(())
}
