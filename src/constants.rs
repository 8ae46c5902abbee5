//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "insectiscan";

/// Logical name of the bundled classification model.
pub const MODEL_ASSET_NAME: &str = "insect_model.onnx";

/// Subdirectory of the platform data directory that holds bundled assets.
pub const ASSETS_DIR_NAME: &str = "assets";

/// Default number of ranked predictions to report per image.
pub const DEFAULT_TOP_K: usize = 3;

/// Default intra-op thread count for the inference engine.
pub const DEFAULT_INTRA_THREADS: usize = 1;

/// Capacity of the request queue in front of the classification worker.
pub const WORKER_QUEUE_CAPACITY: usize = 8;

/// Model input geometry.
pub mod input {
    /// Input width in pixels.
    pub const WIDTH: u32 = 224;
    /// Input height in pixels.
    pub const HEIGHT: u32 = 224;
    /// Colour channels per pixel (R, G, B).
    pub const CHANNELS: usize = 3;
    /// Total `f32` values in one input tensor.
    pub const TENSOR_LEN: usize = WIDTH as usize * HEIGHT as usize * CHANNELS;
    /// Divisor mapping an 8-bit channel onto `[0, 1]`.
    pub const CHANNEL_SCALE: f32 = 255.0;
}

/// Class names in the order of the model's output layer.
pub const INSECT_LABELS: [&str; 5] = ["Bee", "Mosquito", "None", "Spider", "Tick"];

/// Confidence formatting.
pub mod confidence {
    /// Decimal places kept when rounding a raw score for display.
    pub const DISPLAY_DECIMALS: i32 = 2;
    /// Decimal places for machine-readable confidence output.
    pub const DECIMAL_PLACES: usize = 4;
}

/// Image file extensions picked up when scanning directories.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];
