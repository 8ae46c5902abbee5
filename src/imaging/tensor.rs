//! Bitmap to input tensor conversion.
//!
//! The bitmap is stretched to the target size without preserving aspect
//! ratio, matching how the classifier was trained. Pixels are emitted
//! row-major as interleaved R, G, B values in `[0, 1]`; alpha is dropped.

use crate::constants::input;
use crate::error::{Error, Result};
use crate::imaging::Bitmap;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Resampling filter used when stretching a bitmap to the model input size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Target geometry and filter for preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Resampling filter.
    pub filter: ResizeFilter,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            width: input::WIDTH,
            height: input::HEIGHT,
            filter: ResizeFilter::default(),
        }
    }
}

/// A normalized `height x width x 3` float tensor, batch size 1.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl InputTensor {
    /// Tensor shape as `[batch, height, width, channels]`.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, input::CHANNELS]
    }

    /// Number of `f32` values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Take ownership of the flat values.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// Preprocess a bitmap into a 224x224 RGB tensor.
pub fn preprocess(bitmap: &Bitmap) -> Result<InputTensor> {
    preprocess_with(bitmap, &PreprocessOptions::default())
}

/// Preprocess a bitmap with explicit target geometry and filter.
pub fn preprocess_with(bitmap: &Bitmap, options: &PreprocessOptions) -> Result<InputTensor> {
    let (src_w, src_h) = (bitmap.width(), bitmap.height());
    if src_w == 0 || src_h == 0 {
        return Err(Error::PreprocessFailure {
            reason: format!("image has zero size ({src_w}x{src_h})"),
        });
    }
    if options.width == 0 || options.height == 0 {
        return Err(Error::PreprocessFailure {
            reason: format!(
                "target size must be non-zero, got {}x{}",
                options.width, options.height
            ),
        });
    }

    let raster: Cow<'_, image::RgbaImage> = if (src_w, src_h) == (options.width, options.height)
    {
        Cow::Borrowed(bitmap.as_rgba())
    } else {
        Cow::Owned(imageops::resize(
            bitmap.as_rgba(),
            options.width,
            options.height,
            options.filter.into(),
        ))
    };

    let expected = options.width as usize * options.height as usize * input::CHANNELS;
    let mut data = Vec::with_capacity(expected);
    for pixel in raster.pixels() {
        let [r, g, b, _alpha] = pixel.0;
        data.push(f32::from(r) / input::CHANNEL_SCALE);
        data.push(f32::from(g) / input::CHANNEL_SCALE);
        data.push(f32::from(b) / input::CHANNEL_SCALE);
    }

    if data.len() != expected {
        return Err(Error::PreprocessFailure {
            reason: format!(
                "rasterized {} values, expected {expected}",
                data.len()
            ),
        });
    }

    tracing::trace!(
        src_w,
        src_h,
        dst_w = options.width,
        dst_h = options.height,
        "Preprocessed bitmap"
    );

    Ok(InputTensor {
        data,
        width: options.width,
        height: options.height,
    })
}
