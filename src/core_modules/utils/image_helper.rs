// The codec seam between the substitution engine and wherever images live. The engine
// only ever calls `load`; `save` is the caller-facing convenience used by the binary.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::{RememeError, Result};

/// Loads and saves images by path.
pub trait ImageCodec {
    fn load(&self, path: &Path) -> Result<DynamicImage>;

    fn save(&self, image: &DynamicImage, path: &Path) -> Result<()>;
}

/// Filesystem codec backed by the `image` crate. Formats are picked from file
/// contents when loading and from the extension when saving.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCodec;

impl ImageCodec for FileCodec {
    fn load(&self, path: &Path) -> Result<DynamicImage> {
        let image = image::ImageReader::open(path)
            .map_err(|e| RememeError::ImageLoad {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(e),
            })?
            .with_guessed_format()
            .map_err(|e| RememeError::ImageLoad {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(e),
            })?
            .decode()
            .map_err(|source| RememeError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), width = image.width(), height = image.height(), "image loaded");
        Ok(image)
    }

    fn save(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        image.save(path).map_err(|source| RememeError::ImageSave {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "image saved");
        Ok(())
    }
}
