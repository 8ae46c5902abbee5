//! Decoded RGBA8 bitmaps handed to the pipeline by capture or gallery code.

use crate::error::{Error, Result};
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// A decoded, read-only RGBA8 pixel grid of arbitrary dimensions.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pixels: RgbaImage,
}

impl Bitmap {
    /// Wrap raw RGBA8 bytes laid out row-major, four bytes per pixel.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let actual = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(|pixels| Self { pixels })
            .ok_or_else(|| Error::PreprocessFailure {
                reason: format!(
                    "RGBA buffer of {actual} bytes does not match {width}x{height} pixels"
                ),
            })
    }

    /// Convert any decoded image into an RGBA8 bitmap.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }

    /// Decode an encoded image (JPEG, PNG, WebP, BMP) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        image::load_from_memory(bytes)
            .map(Self::from_image)
            .map_err(|e| Error::PreprocessFailure {
                reason: format!("cannot decode image: {e}"),
            })
    }

    /// Decode an image file.
    pub fn open(path: &Path) -> Result<Self> {
        image::open(path)
            .map(Self::from_image)
            .map_err(|e| Error::PreprocessFailure {
                reason: format!("cannot decode '{}': {e}", path.display()),
            })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the underlying RGBA8 raster.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl From<RgbaImage> for Bitmap {
    fn from(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}
