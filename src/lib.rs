// THEORY:
// This file is the main entry point for the `rememe` library crate. It defines the
// public API exposed to callers: the `SubstitutionEngine`, its configuration, and
// the small set of data types it returns.
//
// The leaf algorithms (`core_modules`) stay public for callers who want a single
// stage on its own, such as estimating the dominant color of a template without
// compositing anything.

pub mod core_modules;
pub mod engine;
pub mod error;

pub use core_modules::color::Color;
pub use core_modules::compositor::Placement;
pub use core_modules::region::Region;
pub use core_modules::utils::image_helper::{FileCodec, ImageCodec};
pub use engine::{
    DEFAULT_CLUSTER_AMOUNT, DEFAULT_CLUSTER_RANGE, DEFAULT_THRESHOLD_MAX, DEFAULT_THRESHOLD_MIN,
    SubstitutionConfig, SubstitutionEngine, SubstitutionRecord,
};
pub use error::{RememeError, Result};
