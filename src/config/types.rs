//! Configuration type definitions.

use crate::constants::{DEFAULT_INTRA_THREADS, DEFAULT_TOP_K, MODEL_ASSET_NAME};
use crate::imaging::ResizeFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model asset settings.
    pub model: ModelConfig,

    /// Image preprocessing settings.
    pub preprocess: PreprocessConfig,

    /// Output settings.
    pub output: OutputConfig,
}

/// Where the model comes from and how it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Asset bundle directory. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,

    /// Logical name of the model asset inside the bundle.
    pub asset: String,

    /// Labels file for a retrained model. Defaults to the built-in insect table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<PathBuf>,

    /// Intra-op threads for a forward pass.
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            assets_dir: None,
            asset: MODEL_ASSET_NAME.to_string(),
            labels: None,
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }
}

/// Image preprocessing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Resampling filter for the stretch to model input size.
    pub filter: ResizeFilter,
}

/// Output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format.
    pub format: OutputFormat,

    /// Ranked predictions reported per image.
    pub top_k: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per image.
    #[default]
    Text,
    /// A single JSON document.
    Json,
    /// CSV rows, one per ranked prediction.
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
