//! Plain text output, one line per image.

use crate::error::Result;
use crate::output::{ImageResult, OutputWriter, Outcome};
use std::io::Write;

/// Human-readable writer.
///
/// ```text
/// bite.jpg: Likely: Tick (82%) [Spider 11%, Mosquito 4%]
/// blurry.jpg: error: failed to preprocess image: ...
/// ```
pub struct TextWriter<W: Write> {
    out: W,
}

impl<W: Write> TextWriter<W> {
    /// Create a text writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputWriter for TextWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_result(&mut self, result: &ImageResult) -> Result<()> {
        let source = result.source_display();
        match &result.outcome {
            Outcome::Classified(classification) => {
                write!(self.out, "{source}: {}", classification.top)?;

                let runners_up: Vec<String> = classification
                    .ranked
                    .iter()
                    .skip(1)
                    .map(|r| format!("{} {}%", r.label, r.percent()))
                    .collect();
                if !runners_up.is_empty() {
                    write!(self.out, " [{}]", runners_up.join(", "))?;
                }
                writeln!(self.out)?;
            }
            Outcome::Failed { message, .. } => {
                writeln!(self.out, "{source}: error: {message}")?;
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::inference::{LabelTable, interpret::classify_output};
    use std::path::PathBuf;

    #[test]
    fn test_text_line_with_runners_up() {
        let classification =
            classify_output(&[0.04, 0.11, 0.02, 0.01, 0.82], &LabelTable::insects(), 3).unwrap();
        let mut writer = TextWriter::new(Vec::new());
        writer
            .write_result(&ImageResult::classified(PathBuf::from("bite.jpg"), classification))
            .unwrap();
        writer.finalize().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "bite.jpg: Likely: Tick (82%) [Mosquito 11%, Bee 4%]\n");
    }

    #[test]
    fn test_text_single_prediction() {
        let classification =
            classify_output(&[0.1, 0.05, 0.7049, 0.1, 0.0451], &LabelTable::insects(), 1).unwrap();
        let mut writer = TextWriter::new(Vec::new());
        writer
            .write_result(&ImageResult::classified(PathBuf::from("a.png"), classification))
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "a.png: Likely: None (70%)\n");
    }

    #[test]
    fn test_text_failure_line() {
        let err = Error::NotReady {
            state: crate::inference::EngineState::Failed,
        };
        let mut writer = TextWriter::new(Vec::new());
        writer
            .write_result(&ImageResult::failed(PathBuf::from("x.jpg"), &err))
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.starts_with("x.jpg: error: inference engine is not ready"));
    }
}
