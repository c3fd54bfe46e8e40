use crate::{ImageFilterError, ImageFilterResult, RenderableImage};
use std::path::Path;

/// Decode an encoded photo (PNG or JPEG) into RGBA8.
pub fn decode(bytes: &[u8]) -> ImageFilterResult<RenderableImage> {
    if bytes.is_empty() {
        return Err(ImageFilterError::InvalidInput("no image data".to_string()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| ImageFilterError::InvalidInput(e.to_string()))?
        .to_rgba8();

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageFilterError::InvalidInput(format!(
            "decoded image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }

    Ok(img)
}

pub fn load(path: impl AsRef<Path>) -> ImageFilterResult<RenderableImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());

    decode(&bytes)
}
