use std::path::PathBuf;

use thiserror::Error;

use crate::core_modules::color::Color;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum RememeError {
    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to save image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("No pixels within distance {tolerance} of {color}")]
    RegionNotFound { color: Color, tolerance: f64 },
    #[error("No substitution has been performed yet.")]
    NoPriorSubstitution,
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, RememeError>;
