//! Output type definitions.

use crate::error::{Error, ErrorKind};
use crate::inference::Classification;
use std::path::PathBuf;

/// Classification outcome for one input image.
#[derive(Debug, Clone)]
pub struct ImageResult {
    /// Path to the source image.
    pub source: PathBuf,
    /// Prediction, or why there is none.
    pub outcome: Outcome,
}

/// What happened to an image.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The model produced a prediction.
    Classified(Classification),
    /// Decoding, inference or interpretation failed.
    Failed {
        /// Failure kind.
        kind: ErrorKind,
        /// Human-readable cause.
        message: String,
    },
}

impl ImageResult {
    /// A successful classification.
    pub fn classified(source: PathBuf, classification: Classification) -> Self {
        Self {
            source,
            outcome: Outcome::Classified(classification),
        }
    }

    /// A failed image.
    pub fn failed(source: PathBuf, error: &Error) -> Self {
        Self {
            source,
            outcome: Outcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    /// Whether this image failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Source path as shown to the user.
    pub fn source_display(&self) -> String {
        self.source.display().to_string()
    }
}
