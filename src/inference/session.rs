//! Model session: owns the engine and drives its lifecycle.

use crate::constants::{DEFAULT_TOP_K, MODEL_ASSET_NAME};
use crate::error::{Error, Result};
use crate::imaging::{Bitmap, InputTensor, PreprocessOptions, preprocess_with};
use crate::inference::interpret::{Classification, classify_output};
use crate::inference::{AssetBundle, Engine, EngineLoader, EngineState, LabelTable};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Logical name of the model asset in the bundle.
    pub asset_name: String,
    /// Label table matching the model's output layer.
    pub labels: LabelTable,
    /// Preprocessing geometry and filter.
    pub preprocess: PreprocessOptions,
    /// Ranked predictions kept per classification.
    pub top_k: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            asset_name: MODEL_ASSET_NAME.to_string(),
            labels: LabelTable::insects(),
            preprocess: PreprocessOptions::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// A per-session model handle.
///
/// Loading happens exactly once. If it fails the session stays `Failed`
/// and every later call returns [`Error::NotReady`]. The engine is torn down
/// by [`release`](Self::release) or when the session is dropped.
pub struct ModelSession {
    state: EngineState,
    engine: Option<Mutex<Box<dyn Engine>>>,
    options: SessionOptions,
}

impl ModelSession {
    /// Create an unloaded session.
    pub fn new(options: SessionOptions) -> Self {
        Self {
            state: EngineState::Unloaded,
            engine: None,
            options,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether inference calls are accepted.
    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// Active label table.
    pub fn labels(&self) -> &LabelTable {
        &self.options.labels
    }

    /// Session settings.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Load the model from `bundle` and allocate its tensors.
    ///
    /// Only valid on an `Unloaded` session. Any failure leaves the session
    /// `Failed`.
    pub fn load(&mut self, bundle: &AssetBundle, loader: &dyn EngineLoader) -> Result<()> {
        if self.state != EngineState::Unloaded {
            return Err(Error::NotReady { state: self.state });
        }

        let start = Instant::now();
        match self.try_load(bundle, loader) {
            Ok(()) => {
                info!(
                    "Model '{}' ready in {:.2}s",
                    self.options.asset_name,
                    start.elapsed().as_secs_f64()
                );
                Ok(())
            }
            Err(e) => {
                self.engine = None;
                self.state = EngineState::Failed;
                Err(e)
            }
        }
    }

    fn try_load(&mut self, bundle: &AssetBundle, loader: &dyn EngineLoader) -> Result<()> {
        let name = self.options.asset_name.as_str();
        debug!("Reading model asset '{}' from {}", name, bundle.root().display());
        let bytes = bundle.read(name)?;

        let mut engine = loader.load(name, &bytes)?;
        self.state = EngineState::Loaded;

        engine.allocate_tensors()?;
        self.state = EngineState::TensorsAllocated;

        let expected = self.expected_input_shape();
        if let Some(actual) = engine.input_shape()
            && actual != expected
        {
            warn!(
                "Model input is {:?} but preprocessing produces {:?}; inference will fail",
                actual, expected
            );
        }

        self.engine = Some(Mutex::new(engine));
        self.state = EngineState::Ready;
        Ok(())
    }

    fn expected_input_shape(&self) -> [usize; 4] {
        let p = &self.options.preprocess;
        [1, p.height as usize, p.width as usize, crate::constants::input::CHANNELS]
    }

    /// Run one forward pass and return the raw output vector.
    ///
    /// Calls are serialized; the engine's buffers are reused between them.
    pub fn invoke(&self, tensor: &InputTensor) -> Result<Vec<f32>> {
        let engine = match (&self.engine, self.state) {
            (Some(engine), EngineState::Ready) => engine,
            _ => return Err(Error::NotReady { state: self.state }),
        };

        let mut engine = engine.lock().map_err(|_| Error::InvokeFailure {
            reason: "engine lock poisoned by an earlier panic".to_string(),
        })?;
        engine.copy_input(&tensor.shape(), tensor.as_slice())?;
        engine.invoke()?;
        engine.output()
    }

    /// Preprocess, invoke and interpret a single bitmap.
    pub fn classify(&self, bitmap: &Bitmap) -> Result<Classification> {
        if !self.is_ready() {
            return Err(Error::NotReady { state: self.state });
        }

        let start = Instant::now();
        let tensor = preprocess_with(bitmap, &self.options.preprocess)?;
        let preprocess_time = start.elapsed();

        let output = self.invoke(&tensor)?;
        let invoke_time = start.elapsed().saturating_sub(preprocess_time);

        let classification = classify_output(&output, &self.options.labels, self.options.top_k)?;
        debug!(
            label = %classification.top.label,
            raw = classification.top.raw_score,
            "Classified {}x{} bitmap (preprocess {:.1}ms, invoke {:.1}ms)",
            bitmap.width(),
            bitmap.height(),
            preprocess_time.as_secs_f64() * 1000.0,
            invoke_time.as_secs_f64() * 1000.0
        );
        Ok(classification)
    }

    /// Tear down the engine. Idempotent.
    pub fn release(&mut self) {
        if self.engine.take().is_some() {
            debug!("Released model '{}'", self.options.asset_name);
        }
        if self.state != EngineState::Unloaded {
            self.state = EngineState::Released;
        }
    }
}

impl Drop for ModelSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSession")
            .field("state", &self.state)
            .field("asset_name", &self.options.asset_name)
            .finish_non_exhaustive()
    }
}
