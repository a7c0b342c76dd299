// flightai-cli/src/images.rs

use anyhow::{Context, Result, anyhow};
use flightai_core::GeneratedImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const IMAGE_SUBDIR: &str = "flightai/images";

/// `<cache>/flightai/images`, used when no directory is given on the command line.
pub fn default_image_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|d| d.join(IMAGE_SUBDIR))
        .ok_or_else(|| anyhow!("Could not determine cache directory for generated images"))
}

/// Writes `image` into `dir` as `<uuid>.<ext>`, creating `dir` if needed.
pub fn save_image(dir: &Path, image: &GeneratedImage) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create image directory at {:?}", dir))?;
    let file_path = dir.join(format!("{}.{}", Uuid::new_v4(), image.extension()));
    fs::write(&file_path, &image.bytes)
        .with_context(|| format!("Failed to write image to {:?}", file_path))?;
    info!(
        path = %file_path.display(),
        width = image.width,
        height = image.height,
        "Saved generated image."
    );
    Ok(file_path)
}
