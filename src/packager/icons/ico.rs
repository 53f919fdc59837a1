//! Windows `.ico` generation.

use crate::packager::error::{Error, Result};
use image::imageops::FilterType;
use std::path::Path;

/// Sizes embedded in the generated icon, largest first.
pub const ICO_SIZES: [u32; 6] = [256, 64, 48, 32, 24, 16];

/// Encodes `source` as a multi-resolution `.ico` at `dest`.
pub async fn write_ico(source: &Path, dest: &Path) -> Result<()> {
    let source = source.to_path_buf();
    let dest_path = dest.to_path_buf();
    tokio::task::spawn_blocking(move || encode_ico(&source, &dest_path))
        .await
        .map_err(|e| Error::GenericError(format!("ico task failed: {e}")))??;
    log::info!("✓ Generated {}", dest.display());
    Ok(())
}

fn encode_ico(source: &Path, dest: &Path) -> Result<()> {
    let image = image::open(source).map_err(|e| {
        Error::GenericError(format!("failed to read {}: {e}", source.display()))
    })?;

    let mut dir = ico::IconDir::new(ico::ResourceType::Icon);
    for size in ICO_SIZES {
        let rgba = image
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_rgba8();
        let icon_image = ico::IconImage::from_rgba_data(size, size, rgba.into_raw());
        let entry = ico::IconDirEntry::encode(&icon_image)
            .map_err(|e| Error::GenericError(format!("failed to encode ICO: {e}")))?;
        dir.add_entry(entry);
    }

    let mut file = std::fs::File::create(dest)?;
    dir.write(&mut file)
        .map_err(|e| Error::GenericError(format!("failed to write ICO: {e}")))
}
