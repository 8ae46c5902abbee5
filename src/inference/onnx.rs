//! ONNX Runtime engine backend.

use crate::error::{Error, Result};
use crate::inference::{Engine, EngineLoader, check_input_layout};
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use tracing::{debug, info};

/// Loads models into ONNX Runtime sessions.
#[derive(Debug, Clone, Copy)]
pub struct OnnxLoader {
    intra_threads: usize,
}

impl OnnxLoader {
    /// Create a loader that runs each forward pass on `intra_threads` threads.
    pub fn new(intra_threads: usize) -> Self {
        Self {
            intra_threads: intra_threads.max(1),
        }
    }
}

impl EngineLoader for OnnxLoader {
    fn load(&self, name: &str, model: &[u8]) -> Result<Box<dyn Engine>> {
        let load_failure = |reason: String| Error::LoadFailure {
            name: name.to_string(),
            reason,
        };

        let builder = Session::builder()
            .map_err(|e| load_failure(format!("cannot create session builder: {e}")))?;
        let mut builder = builder
            .with_intra_threads(self.intra_threads)
            .map_err(|e| load_failure(format!("cannot set thread count: {e}")))?;
        let session = builder
            .commit_from_memory(model)
            .map_err(|e| load_failure(e.to_string()))?;

        let engine = OnnxEngine::from_session(name, session)?;
        info!(
            "Loaded model '{}': input '{}' {:?}, output '{}' {:?}",
            name, engine.input_name, engine.declared_input, engine.output_name, engine.declared_output
        );
        Ok(Box::new(engine))
    }
}

/// An ONNX Runtime session with reusable slot-0 buffers.
pub struct OnnxEngine {
    session: Session,
    input_name: String,
    output_name: String,
    declared_input: Vec<i64>,
    declared_output: Vec<i64>,
    input_shape: Vec<i64>,
    input_dims: Vec<usize>,
    input: Vec<f32>,
    output: Vec<f32>,
    allocated: bool,
    has_input: bool,
    has_output: bool,
}

impl OnnxEngine {
    fn from_session(name: &str, session: Session) -> Result<Self> {
        let (input_name, declared_input) = {
            let input = session.inputs().first().ok_or_else(|| Error::LoadFailure {
                name: name.to_string(),
                reason: "model declares no inputs".to_string(),
            })?;
            (input.name().to_string(), tensor_dims(input.dtype()))
        };
        let (output_name, declared_output) = {
            let output = session.outputs().first().ok_or_else(|| Error::LoadFailure {
                name: name.to_string(),
                reason: "model declares no outputs".to_string(),
            })?;
            (output.name().to_string(), tensor_dims(output.dtype()))
        };

        let declared_input = declared_input.ok_or_else(|| Error::LoadFailure {
            name: name.to_string(),
            reason: format!("input '{input_name}' is not a tensor"),
        })?;
        let declared_output = declared_output.ok_or_else(|| Error::LoadFailure {
            name: name.to_string(),
            reason: format!("output '{output_name}' is not a tensor"),
        })?;

        Ok(Self {
            session,
            input_name,
            output_name,
            declared_input,
            declared_output,
            input_shape: Vec::new(),
            input_dims: Vec::new(),
            input: Vec::new(),
            output: Vec::new(),
            allocated: false,
            has_input: false,
            has_output: false,
        })
    }
}

impl Engine for OnnxEngine {
    fn allocate_tensors(&mut self) -> Result<()> {
        let resolved = resolve_shape(&self.declared_input, "input")?;
        let input = allocate(resolved.len, "input")?;

        // Dynamic output shapes are sized by the first forward pass.
        let output = match resolve_shape(&self.declared_output, "output") {
            Ok(shape) => allocate(shape.len, "output")?,
            Err(_) => Vec::new(),
        };

        debug!(
            "Allocated tensors: input {:?} ({} values), output capacity {}",
            resolved.dims,
            resolved.len,
            output.capacity()
        );

        self.input_shape = resolved.dims;
        self.input_dims = resolved.sizes;
        self.input = input;
        self.output = output;
        self.allocated = true;
        Ok(())
    }

    fn input_shape(&self) -> Option<&[usize]> {
        self.allocated.then_some(self.input_dims.as_slice())
    }

    fn copy_input(&mut self, shape: &[usize], values: &[f32]) -> Result<()> {
        if !self.allocated {
            return Err(Error::AllocationError {
                reason: "input tensor has not been allocated".to_string(),
            });
        }
        check_input_layout(&self.input_dims, shape, values)?;
        self.input.copy_from_slice(values);
        self.has_input = true;
        Ok(())
    }

    fn invoke(&mut self) -> Result<()> {
        if !self.has_input {
            return Err(Error::InvokeFailure {
                reason: "no input has been copied into slot 0".to_string(),
            });
        }

        let tensor = TensorRef::from_array_view((self.input_shape.clone(), self.input.as_slice()))
            .map_err(|e| Error::InvokeFailure {
                reason: format!("cannot bind input '{}': {e}", self.input_name),
            })?;

        self.has_output = false;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::InvokeFailure {
                reason: e.to_string(),
            })?;

        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::OutputReadError {
                reason: format!("output '{}': {e}", self.output_name),
            })?;

        self.output.clear();
        self.output.extend_from_slice(data);
        self.has_output = true;
        Ok(())
    }

    fn output(&self) -> Result<Vec<f32>> {
        if !self.has_output {
            return Err(Error::OutputReadError {
                reason: "no forward pass has completed".to_string(),
            });
        }
        Ok(self.output.clone())
    }
}

/// Declared dimensions of a tensor value, `None` for non-tensor values.
fn tensor_dims(value_type: &ValueType) -> Option<Vec<i64>> {
    match value_type {
        ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
        _ => None,
    }
}

/// A declared shape with every dimension made concrete.
#[derive(Debug, PartialEq, Eq)]
struct ResolvedShape {
    /// Dimensions as ONNX Runtime takes them.
    dims: Vec<i64>,
    /// The same dimensions as buffer sizes.
    sizes: Vec<usize>,
    /// Total element count.
    len: usize,
}

/// Resolve declared dimensions to a concrete shape and element count.
///
/// A dynamic leading dimension is the batch axis and resolves to 1. Any
/// other dynamic dimension cannot be sized ahead of time.
fn resolve_shape(dims: &[i64], what: &str) -> Result<ResolvedShape> {
    if dims.is_empty() {
        return Err(Error::AllocationError {
            reason: format!("{what} tensor is a scalar"),
        });
    }

    let mut shape = Vec::with_capacity(dims.len());
    let mut sizes = Vec::with_capacity(dims.len());
    let mut count: usize = 1;
    for (axis, &dim) in dims.iter().enumerate() {
        let resolved = match dim {
            d if d > 0 => d,
            _ if axis == 0 => 1,
            _ => {
                return Err(Error::AllocationError {
                    reason: format!("{what} dimension {axis} is dynamic ({dims:?})"),
                });
            }
        };
        let size = usize::try_from(resolved).map_err(|_| Error::AllocationError {
            reason: format!("{what} dimension {axis} does not fit in memory"),
        })?;
        count = count.checked_mul(size).ok_or_else(|| Error::AllocationError {
            reason: format!("{what} shape {dims:?} overflows"),
        })?;
        shape.push(resolved);
        sizes.push(size);
    }

    Ok(ResolvedShape {
        dims: shape,
        sizes,
        len: count,
    })
}

fn allocate(len: usize, what: &str) -> Result<Vec<f32>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|e| Error::AllocationError {
            reason: format!("{what} buffer of {len} values: {e}"),
        })?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}
