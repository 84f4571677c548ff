use std::path::Path;

use image::{DynamicImage, ImageFormat};
use log::info;

use crate::error::{BridgeError, Result};
use crate::platform::Bitmap;

/// In-memory bitmap decoded with the `image` crate, owned by a single request.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl Bitmap for DecodedImage {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }
}

impl DecodedImage {
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| BridgeError::platform("Failed to stage wallpaper image", e))
    }
}

/// Undoes the signed reinterpretation before the bytes reach a codec.
pub fn to_raw_bytes(bytes: &[i8]) -> Vec<u8> {
    bytes.iter().map(|&b| b as u8).collect()
}

pub fn from_bytes(bytes: &[u8], origin: &str) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes).map_err(|e| BridgeError::decode(origin, e))?;
    info!(
        "Decoded {}x{} image from {} ({} bytes)",
        image.width(),
        image.height(),
        origin,
        bytes.len()
    );
    Ok(DecodedImage { image })
}
