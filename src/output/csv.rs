//! CSV output format writer.

use crate::constants::confidence::DECIMAL_PLACES;
use crate::error::{Error, Result};
use crate::output::{ImageResult, OutputWriter, Outcome};
use std::io::Write;

const HEADER: [&str; 6] = ["file", "rank", "label", "probability", "raw_score", "error"];

/// CSV writer: one row per ranked prediction, one row per failed image.
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    /// Create a CSV writer.
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| Error::CsvWrite {
            source: e.into_error().into(),
        })
    }
}

impl<W: Write> OutputWriter for CsvWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(HEADER)
            .map_err(|e| Error::CsvWrite { source: e })
    }

    fn write_result(&mut self, result: &ImageResult) -> Result<()> {
        let file = result.source_display();
        match &result.outcome {
            Outcome::Classified(classification) => {
                for (index, prediction) in classification.ranked.iter().enumerate() {
                    let rank = (index + 1).to_string();
                    let probability = format!("{:.2}", prediction.probability);
                    let raw_score =
                        format!("{:.decimal$}", prediction.raw_score, decimal = DECIMAL_PLACES);
                    self.writer
                        .write_record([
                            file.as_str(),
                            rank.as_str(),
                            prediction.label.as_str(),
                            probability.as_str(),
                            raw_score.as_str(),
                            "",
                        ])
                        .map_err(|e| Error::CsvWrite { source: e })?;
                }
            }
            Outcome::Failed { message, .. } => {
                self.writer
                    .write_record([file.as_str(), "", "", "", "", message.as_str()])
                    .map_err(|e| Error::CsvWrite { source: e })?;
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::{LabelTable, interpret::classify_output};
    use std::path::PathBuf;

    #[test]
    fn test_csv_writer_basic() {
        let classification =
            classify_output(&[0.1, 0.05, 0.7, 0.1, 0.05], &LabelTable::insects(), 2).unwrap();
        let mut writer = CsvWriter::new(Vec::new());
        writer.write_header().unwrap();
        writer
            .write_result(&ImageResult::classified(
                PathBuf::from("photos/bite, left arm.jpg"),
                classification,
            ))
            .unwrap();
        writer.finalize().unwrap();

        let contents = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "file,rank,label,probability,raw_score,error");
        assert_eq!(lines[1], "\"photos/bite, left arm.jpg\",1,None,0.70,0.7000,");
        assert_eq!(lines[2], "\"photos/bite, left arm.jpg\",2,Bee,0.10,0.1000,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_failure_row() {
        let err = Error::AssetNotFound {
            name: "insect_model.onnx".to_string(),
            bundle: PathBuf::from("/assets"),
        };
        let mut writer = CsvWriter::new(Vec::new());
        writer
            .write_result(&ImageResult::failed(PathBuf::from("a.jpg"), &err))
            .unwrap();
        let contents = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(contents.starts_with("a.jpg,,,,,model asset"));
    }
}
