//! Output format writers.

mod csv;
mod json;
pub mod progress;
mod text;
mod types;
mod writer;

pub use csv::CsvWriter;
pub use json::{JsonDocument, JsonError, JsonImage, JsonPrediction, JsonSummary, JsonWriter};
pub use text::TextWriter;
pub use types::{ImageResult, Outcome};
pub use writer::{OutputWriter, create_writer};
