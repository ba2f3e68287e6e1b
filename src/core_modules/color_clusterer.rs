// THEORY:
// The `ColorClusterer` answers a single question about a template: "which color
// covers most of it?" That color is assumed to be the placeholder the substitute
// will replace.
//
// Algorithm (k-means over RGB):
// 1.  **Sampling**: Pixels are read on a square grid, one stride shared by both
//     axes, so that at most `max_samples` colors enter the clustering. Striding
//     rows and columns separately keeps every part of the image represented; a
//     single stride over the flattened buffer would revisit the same columns
//     whenever the width divides it. The stride depends on the image size alone,
//     so the same image always yields the same samples.
// 2.  **Seeding**: Centroids are seeded by farthest-point selection, starting from
//     the first sample. Each new centroid is the sample farthest from every centroid
//     chosen so far. No randomness is involved, so results are repeatable across a
//     parameter sweep.
// 3.  **Refinement**: Lloyd iterations assign every sample to its nearest centroid
//     and move each centroid to the mean of its members, until no centroid moves
//     more than `CONVERGENCE_EPSILON` or `max_iterations` is reached.
// 4.  **Selection**: The centroid of the largest cluster is the dominant color.
//
// Degenerate input is not an error. When `k` exceeds the number of distinct colors,
// seeding stops early and empty clusters are never selected.
//
// `k == 0` is a fast path: the placeholder is assumed to be white and no pixel is
// inspected at all.

use image::{GenericImageView, Rgba};
use tracing::debug;

use crate::core_modules::color::{Channel, Color};

pub const DEFAULT_MAX_ITERATIONS: usize = 20;
pub const DEFAULT_MAX_SAMPLES: usize = 40_000;

/// Centroids that move less than this (in RGB units) count as converged.
const CONVERGENCE_EPSILON: f64 = 0.5;

type Centroid = [f64; 3];

/// Tunable bounds for the clustering work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Hard cap on refinement passes. Guarantees termination.
    pub max_iterations: usize,
    /// Upper bound on the number of pixels that take part in clustering.
    pub max_samples: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Returns the dominant color of `image` using `cluster_amount` clusters.
///
/// A `cluster_amount` of zero returns white without reading pixels. An empty image
/// also yields white, since there is nothing to cluster.
pub fn dominant_color<I>(image: &I, cluster_amount: usize, options: &ClusterOptions) -> Color
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    if cluster_amount == 0 {
        return Color::WHITE;
    }

    let samples = sample_colors(image, options.max_samples);
    if samples.is_empty() {
        return Color::WHITE;
    }

    let mut centroids = seed_centroids(&samples, cluster_amount);
    let mut iterations = 0;
    while iterations < options.max_iterations {
        iterations += 1;
        let (sums, counts) = accumulate(&samples, &centroids);

        let mut max_shift = 0.0f64;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            // Empty clusters keep their seed; they can never win selection.
            if counts[i] == 0 {
                continue;
            }
            let n = counts[i] as f64;
            let updated = [sums[i][0] / n, sums[i][1] / n, sums[i][2] / n];
            max_shift = max_shift.max(centroid_distance(centroid, &updated));
            *centroid = updated;
        }

        if max_shift < CONVERGENCE_EPSILON {
            break;
        }
    }

    let (_, counts) = accumulate(&samples, &centroids);
    let mut largest = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[largest] {
            largest = i;
        }
    }

    let dominant = to_color(&centroids[largest]);
    debug!(
        requested = cluster_amount,
        seeded = centroids.len(),
        iterations,
        samples = samples.len(),
        share = counts[largest] as f64 / samples.len() as f64,
        color = %dominant,
        "dominant color estimated"
    );
    dominant
}

/// Reads at most `max_samples` colors on a square grid over the image.
fn sample_colors<I>(image: &I, max_samples: usize) -> Vec<Color>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let total = width as usize * height as usize;
    if total == 0 || max_samples == 0 {
        return Vec::new();
    }

    let stride = grid_stride(width as usize, height as usize, max_samples);
    let mut samples = Vec::with_capacity(max_samples.min(total));
    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            samples.push(Color::from(image.get_pixel(x, y)));
        }
    }
    samples
}

/// Smallest grid stride whose sample count stays within `max_samples`.
fn grid_stride(width: usize, height: usize, max_samples: usize) -> usize {
    let ratio = (width * height) as f64 / max_samples as f64;
    let mut stride = (ratio.sqrt().ceil() as usize).max(1);
    // Thin images need a coarser stride than the square-root estimate.
    while width.div_ceil(stride) * height.div_ceil(stride) > max_samples {
        stride += 1;
    }
    stride
}

/// Farthest-point seeding. Stops early once every sample coincides with a centroid.
fn seed_centroids(samples: &[Color], cluster_amount: usize) -> Vec<Centroid> {
    let mut centroids: Vec<Centroid> = Vec::with_capacity(cluster_amount);
    centroids.push(to_centroid(&samples[0]));

    while centroids.len() < cluster_amount {
        let mut farthest = 0.0f64;
        let mut candidate = None;

        for sample in samples {
            let point = to_centroid(sample);
            let nearest = centroids
                .iter()
                .map(|c| centroid_distance_squared(c, &point))
                .fold(f64::INFINITY, f64::min);
            if nearest > farthest {
                farthest = nearest;
                candidate = Some(point);
            }
        }

        match candidate {
            Some(point) => centroids.push(point),
            // No distinct colors left to seed from.
            None => break,
        }
    }
    centroids
}

/// Assigns each sample to its nearest centroid; returns per-cluster channel sums and counts.
fn accumulate(samples: &[Color], centroids: &[Centroid]) -> (Vec<Centroid>, Vec<usize>) {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for sample in samples {
        let point = to_centroid(sample);
        let mut nearest = 0;
        let mut best = f64::INFINITY;
        for (i, centroid) in centroids.iter().enumerate() {
            let d = centroid_distance_squared(centroid, &point);
            if d < best {
                best = d;
                nearest = i;
            }
        }
        sums[nearest][0] += point[0];
        sums[nearest][1] += point[1];
        sums[nearest][2] += point[2];
        counts[nearest] += 1;
    }
    (sums, counts)
}

fn to_centroid(color: &Color) -> Centroid {
    [color.red as f64, color.green as f64, color.blue as f64]
}

fn to_color(centroid: &Centroid) -> Color {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as Channel;
    Color::new(channel(centroid[0]), channel(centroid[1]), channel(centroid[2]))
}

fn centroid_distance_squared(a: &Centroid, b: &Centroid) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn centroid_distance(a: &Centroid, b: &Centroid) -> f64 {
    centroid_distance_squared(a, b).sqrt()
}
