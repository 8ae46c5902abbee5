//! JSON output format writer.

use crate::error::{Error, Result};
use crate::inference::ClassificationResult;
use crate::output::{ImageResult, OutputWriter, Outcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// JSON document emitted at the end of a run.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDocument {
    /// When the document was written.
    pub generated_at: DateTime<Utc>,
    /// Model asset used.
    pub model: String,
    /// Per-image results in input order.
    pub results: Vec<JsonImage>,
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Result for one image.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonImage {
    /// Source image path.
    pub source: String,
    /// Top prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<JsonPrediction>,
    /// Ranked predictions, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranked: Vec<JsonPrediction>,
    /// Failure, if the image could not be classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// A labelled score.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonPrediction {
    /// Class name.
    pub label: String,
    /// Probability rounded to two decimals.
    pub probability: f32,
    /// Whole percent as displayed.
    pub percent: u32,
    /// Unrounded model score.
    pub raw_score: f32,
}

/// A failed image.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    /// Failure kind in snake case.
    pub kind: String,
    /// Human-readable cause.
    pub message: String,
}

/// Summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Images seen.
    pub total: usize,
    /// Images with a prediction.
    pub classified: usize,
    /// Images that failed.
    pub failed: usize,
}

impl From<&ClassificationResult> for JsonPrediction {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            label: result.label.clone(),
            probability: result.probability,
            percent: result.percent(),
            raw_score: result.raw_score,
        }
    }
}

/// Collects results and writes a single pretty-printed document on finalize.
pub struct JsonWriter<W: Write> {
    out: W,
    model: String,
    results: Vec<JsonImage>,
}

impl<W: Write> JsonWriter<W> {
    /// Create a JSON writer.
    pub fn new(out: W, model: &str) -> Self {
        Self {
            out,
            model: model.to_string(),
            results: Vec::new(),
        }
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn compute_summary(&self) -> JsonSummary {
        let failed = self.results.iter().filter(|r| r.error.is_some()).count();
        JsonSummary {
            total: self.results.len(),
            classified: self.results.len() - failed,
            failed,
        }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        // Written at finalize
        Ok(())
    }

    fn write_result(&mut self, result: &ImageResult) -> Result<()> {
        let source = result.source_display();
        let image = match &result.outcome {
            Outcome::Classified(classification) => JsonImage {
                source,
                prediction: Some(JsonPrediction::from(&classification.top)),
                ranked: classification.ranked.iter().map(JsonPrediction::from).collect(),
                error: None,
            },
            Outcome::Failed { kind, message } => JsonImage {
                source,
                prediction: None,
                ranked: Vec::new(),
                error: Some(JsonError {
                    kind: kind.to_string(),
                    message: message.clone(),
                }),
            },
        };
        self.results.push(image);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let document = JsonDocument {
            generated_at: Utc::now(),
            model: self.model.clone(),
            summary: self.compute_summary(),
            results: std::mem::take(&mut self.results),
        };

        serde_json::to_writer_pretty(&mut self.out, &document)
            .map_err(|e| Error::JsonWrite { source: e })?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
