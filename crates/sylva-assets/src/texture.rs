//! Decoded texture pixels.

use std::path::Path;

use crate::resource_mgr::AssetError;

/// RGBA8 texture data decoded from an image file.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row-major.
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Decodes any image format supported by the `image` crate into RGBA8.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// Returns `true` if any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.rgba.chunks_exact(4).any(|px| px[3] < 255)
    }
}
