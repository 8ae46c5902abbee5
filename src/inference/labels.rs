//! Label table mapping output indices to class names.

use crate::constants::INSECT_LABELS;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Ordered class names, positionally matching the model's output vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// The table the bundled insect model was trained with.
    pub fn insects() -> Self {
        Self {
            labels: INSECT_LABELS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Build a table from class names in output order.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::EmptyLabelTable);
        }
        Ok(Self { labels })
    }

    /// Read a labels file.
    ///
    /// # File Format
    /// - One label per line, in output-layer order
    /// - Surrounding whitespace is trimmed
    /// - Blank lines are ignored
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::LabelsFileNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::LabelsRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let mut labels = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::LabelsRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                labels.push(trimmed.to_string());
            }
        }

        Self::new(labels)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: a table holds at least one class.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Class name at output index `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Iterate class names in output order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::insects()
    }
}
