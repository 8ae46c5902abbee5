//! Image preprocessing pipeline.

mod bitmap;
mod tensor;

pub use bitmap::Bitmap;
pub use tensor::{InputTensor, PreprocessOptions, ResizeFilter, preprocess, preprocess_with};
