//! Output writer trait definition.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::{CsvWriter, ImageResult, JsonWriter, TextWriter};
use std::io::Write;

/// Trait for writing classification results.
pub trait OutputWriter {
    /// Write the header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write the result for a single image.
    fn write_result(&mut self, result: &ImageResult) -> Result<()>;

    /// Finalize the output (flush, emit buffered documents).
    fn finalize(&mut self) -> Result<()>;
}

/// Build the writer for `format` over `out`.
pub fn create_writer<W: Write + 'static>(
    format: OutputFormat,
    out: W,
    model: &str,
) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Text => Box::new(TextWriter::new(out)),
        OutputFormat::Json => Box::new(JsonWriter::new(out, model)),
        OutputFormat::Csv => Box::new(CsvWriter::new(out)),
    }
}
