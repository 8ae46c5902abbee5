//! On-device inference: asset loading, engine lifecycle and result mapping.

mod assets;
mod engine;
pub mod interpret;
mod labels;
mod onnx;
mod session;

pub use assets::AssetBundle;
pub use engine::{Engine, EngineLoader, EngineState, check_input_layout};
pub use interpret::{Classification, ClassificationResult, interpret, rank};
pub use labels::LabelTable;
pub use onnx::{OnnxEngine, OnnxLoader};
pub use session::{ModelSession, SessionOptions};
