//! Error types for insectiscan.

use crate::inference::EngineState;

/// Result type alias for insectiscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for insectiscan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model asset is missing from the bundle.
    #[error("model asset '{name}' not found in bundle '{bundle}'")]
    AssetNotFound {
        /// Logical asset name.
        name: String,
        /// Bundle directory that was searched.
        bundle: std::path::PathBuf,
    },

    /// Model binary could not be read or parsed by the engine.
    #[error("failed to load model '{name}': {reason}")]
    LoadFailure {
        /// Logical asset name.
        name: String,
        /// Description of the failure.
        reason: String,
    },

    /// Engine tensor buffers could not be allocated.
    #[error("failed to allocate engine tensors: {reason}")]
    AllocationError {
        /// Description of the failure.
        reason: String,
    },

    /// Bitmap could not be decoded or rasterized into an input tensor.
    #[error("failed to preprocess image: {reason}")]
    PreprocessFailure {
        /// Description of the failure.
        reason: String,
    },

    /// Input tensor does not match the model's declared input layout.
    #[error("input tensor layout mismatch: model expects {expected:?}, got {actual:?}")]
    CopyFailure {
        /// Shape the model declares for input slot 0.
        expected: Vec<usize>,
        /// Shape of the tensor that was supplied.
        actual: Vec<usize>,
    },

    /// Forward pass failed at runtime.
    #[error("inference failed: {reason}")]
    InvokeFailure {
        /// Description of the failure.
        reason: String,
    },

    /// Output slot 0 could not be read as a flat f32 vector.
    #[error("failed to read model output: {reason}")]
    OutputReadError {
        /// Description of the failure.
        reason: String,
    },

    /// Raw output could not be mapped onto the label table.
    #[error("cannot map model output onto labels: {reason}")]
    ResultMappingFailure {
        /// Description of the failure.
        reason: String,
    },

    /// Inference was requested while the engine is not ready.
    #[error("inference engine is not ready (state: {state})")]
    NotReady {
        /// Engine state at the time of the call.
        state: EngineState,
    },

    /// The requesting view was torn down before the result was delivered.
    #[error("classification result discarded: requesting view is gone")]
    Discarded,

    /// The classification worker has shut down.
    #[error("classification worker is not running")]
    WorkerStopped,

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Data directory could not be determined.
    #[error("could not determine data directory for this platform")]
    DataDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Labels file does not exist.
    #[error("labels file does not exist: {path}")]
    LabelsFileNotFound {
        /// Path to the missing labels file.
        path: std::path::PathBuf,
    },

    /// Failed to read labels file.
    #[error("failed to read labels file '{path}'")]
    LabelsRead {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Label table is empty.
    #[error("label table is empty")]
    EmptyLabelTable,

    /// No image files found in the provided paths.
    #[error("no image files found in the provided paths")]
    NoValidImageFiles,

    /// Failed to write CSV output.
    #[error("failed to write CSV output")]
    CsvWrite {
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write JSON output.
    #[error("failed to write JSON output")]
    JsonWrite {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (runtime setup, task join).
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

/// Fieldless failure kind, for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Model asset is missing.
    AssetNotFound,
    /// Model binary failed to parse.
    LoadFailure,
    /// Tensor allocation failed.
    AllocationError,
    /// Bitmap could not be turned into a tensor.
    PreprocessFailure,
    /// Input layout mismatch.
    CopyFailure,
    /// Forward pass failed.
    InvokeFailure,
    /// Output could not be read.
    OutputReadError,
    /// Output could not be mapped onto labels.
    ResultMappingFailure,
    /// Engine not ready.
    NotReady,
    /// Result discarded because the requesting view is gone.
    Discarded,
    /// Configuration, I/O and other ambient failures.
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AssetNotFound => "asset_not_found",
            Self::LoadFailure => "load_failure",
            Self::AllocationError => "allocation_error",
            Self::PreprocessFailure => "preprocess_failure",
            Self::CopyFailure => "copy_failure",
            Self::InvokeFailure => "invoke_failure",
            Self::OutputReadError => "output_read_error",
            Self::ResultMappingFailure => "result_mapping_failure",
            Self::NotReady => "not_ready",
            Self::Discarded => "discarded",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Get the failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            Self::LoadFailure { .. } => ErrorKind::LoadFailure,
            Self::AllocationError { .. } => ErrorKind::AllocationError,
            Self::PreprocessFailure { .. } => ErrorKind::PreprocessFailure,
            Self::CopyFailure { .. } => ErrorKind::CopyFailure,
            Self::InvokeFailure { .. } => ErrorKind::InvokeFailure,
            Self::OutputReadError { .. } => ErrorKind::OutputReadError,
            Self::ResultMappingFailure { .. } => ErrorKind::ResultMappingFailure,
            Self::NotReady { .. } => ErrorKind::NotReady,
            Self::Discarded => ErrorKind::Discarded,
            _ => ErrorKind::Other,
        }
    }
}
