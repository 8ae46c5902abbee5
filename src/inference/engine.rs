//! Inference engine abstraction.
//!
//! An [`Engine`] mirrors the interpreter lifecycle of an embedded runtime:
//! buffers are allocated once, then every call copies into input slot 0,
//! runs the forward pass and reads output slot 0. Buffers are reused across
//! calls, so an engine must never be driven from two threads at once.

use crate::error::{Error, Result};

/// Lifecycle state of the engine owned by a [`ModelSession`](super::ModelSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No model loaded yet.
    Unloaded,
    /// Model parsed, tensors not yet allocated.
    Loaded,
    /// Input and output buffers allocated.
    TensorsAllocated,
    /// Accepting inference calls.
    Ready,
    /// Loading failed. Sticky for the rest of the session.
    Failed,
    /// Engine torn down at the end of the session.
    Released,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loaded => write!(f, "loaded"),
            Self::TensorsAllocated => write!(f, "tensors-allocated"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// A loaded model that can run forward passes on a single input.
pub trait Engine: Send {
    /// Allocate input and output buffers for the shapes the model declares.
    fn allocate_tensors(&mut self) -> Result<()>;

    /// Concrete shape of input slot 0, once allocated.
    fn input_shape(&self) -> Option<&[usize]>;

    /// Copy a flat `f32` buffer laid out as `shape` into input slot 0.
    ///
    /// Fails with [`Error::CopyFailure`] unless `shape` is exactly the
    /// allocated input shape.
    fn copy_input(&mut self, shape: &[usize], values: &[f32]) -> Result<()>;

    /// Run the forward pass synchronously.
    fn invoke(&mut self) -> Result<()>;

    /// Read output slot 0 as a flat `f32` vector.
    fn output(&self) -> Result<Vec<f32>>;
}

/// Builds an [`Engine`] from the raw bytes of a model asset.
pub trait EngineLoader {
    /// Parse `model` (named `name` for diagnostics) into an engine.
    fn load(&self, name: &str, model: &[u8]) -> Result<Box<dyn Engine>>;
}

/// Check a tensor against the declared input shape before it is copied.
///
/// Same element count is not enough: `[1, 3, 224, 224]` and `[1, 224, 224, 3]`
/// hold the same number of values in a different order.
pub fn check_input_layout(declared: &[usize], shape: &[usize], values: &[f32]) -> Result<()> {
    if declared != shape {
        return Err(Error::CopyFailure {
            expected: declared.to_vec(),
            actual: shape.to_vec(),
        });
    }
    let len: usize = declared.iter().product();
    if values.len() != len {
        return Err(Error::CopyFailure {
            expected: declared.to_vec(),
            actual: vec![values.len()],
        });
    }
    Ok(())
}
