//! Mapping raw model output onto labelled, display-ready results.

use crate::constants::confidence::DISPLAY_DECIMALS;
use crate::error::{Error, Result};
use crate::inference::LabelTable;
use serde::Serialize;
use std::cmp::Ordering;

/// The predicted class for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Class name.
    pub label: String,
    /// Score rounded to two decimals, in `[0, 1]`.
    pub probability: f32,
    /// Unrounded score from the model.
    pub raw_score: f32,
}

impl ClassificationResult {
    fn new(label: &str, raw_score: f32) -> Self {
        Self {
            label: label.to_string(),
            probability: round_probability(raw_score),
            raw_score,
        }
    }

    /// Whole percent for display: the two-decimal probability times 100.
    pub fn percent(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (f64::from(self.probability) * 100.0).round() as u32;
        percent
    }
}

impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Likely: {} ({}%)", self.label, self.percent())
    }
}

/// Top prediction plus the ranked list it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Highest-scoring class.
    pub top: ClassificationResult,
    /// Best classes in descending score order, `top` first.
    pub ranked: Vec<ClassificationResult>,
}

/// Round a raw score to two decimal places.
///
/// Percent display multiplies this rounded value by 100, so `0.7049` shows
/// as 70% and sub-percent precision is dropped.
pub fn round_probability(raw: f32) -> f32 {
    let scale = 10_f64.powi(DISPLAY_DECIMALS);
    #[allow(clippy::cast_possible_truncation)]
    let rounded = ((f64::from(raw) * scale).round() / scale) as f32;
    rounded
}

/// Select the highest-scoring label. Exact ties go to the lowest index.
pub fn interpret(output: &[f32], labels: &LabelTable) -> Result<ClassificationResult> {
    check_mapping(output, labels)?;

    let mut best_index = 0;
    let mut best_score = f32::NEG_INFINITY;
    for (index, &score) in output.iter().enumerate() {
        if score > best_score {
            best_index = index;
            best_score = score;
        }
    }

    let label = labels.get(best_index).ok_or_else(|| Error::ResultMappingFailure {
        reason: format!("no label at index {best_index}"),
    })?;
    Ok(ClassificationResult::new(label, best_score))
}

/// The `top_k` best labels in descending score order, ties in index order.
pub fn rank(output: &[f32], labels: &LabelTable, top_k: usize) -> Result<Vec<ClassificationResult>> {
    check_mapping(output, labels)?;

    let mut scored: Vec<(&str, f32)> = labels.iter().zip(output.iter().copied()).collect();
    // Stable sort keeps equal scores in index order. NaN was rejected above,
    // and -0.0 must tie with 0.0 as it does in `interpret`.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(top_k)
        .map(|(label, score)| ClassificationResult::new(label, score))
        .collect())
}

/// Interpret and rank in one pass over the same output.
pub fn classify_output(
    output: &[f32],
    labels: &LabelTable,
    top_k: usize,
) -> Result<Classification> {
    let top = interpret(output, labels)?;
    let ranked = rank(output, labels, top_k.max(1))?;
    Ok(Classification { top, ranked })
}

fn check_mapping(output: &[f32], labels: &LabelTable) -> Result<()> {
    if output.len() != labels.len() {
        return Err(Error::ResultMappingFailure {
            reason: format!(
                "model produced {} scores for {} labels",
                output.len(),
                labels.len()
            ),
        });
    }
    if let Some(index) = output.iter().position(|v| !v.is_finite()) {
        return Err(Error::ResultMappingFailure {
            reason: format!("score at index {index} is not finite"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_argmax_to_label() {
        let result = interpret(&[0.1, 0.05, 0.7, 0.1, 0.05], &LabelTable::insects()).unwrap();
        assert_eq!(result.label, "None");
        assert_eq!(result.probability, 0.70);
    }

    #[test]
    fn test_exact_tie_picks_first_index() {
        for _ in 0..100 {
            let result = interpret(&[0.5, 0.5, 0.0, 0.0, 0.0], &LabelTable::insects()).unwrap();
            assert_eq!(result.label, "Bee");
            assert_eq!(result.probability, 0.50);
        }
    }

    #[test]
    fn test_tie_later_in_vector() {
        let result = interpret(&[0.1, 0.2, 0.1, 0.3, 0.3], &LabelTable::insects()).unwrap();
        assert_eq!(result.label, "Spider");
    }

    #[test]
    fn test_short_output_is_mapping_failure() {
        let result = interpret(&[0.25, 0.25, 0.25, 0.25], &LabelTable::insects());
        assert!(matches!(result, Err(Error::ResultMappingFailure { .. })));
    }

    #[test]
    fn test_long_output_is_mapping_failure() {
        let result = interpret(&[0.1; 6], &LabelTable::insects());
        assert!(matches!(result, Err(Error::ResultMappingFailure { .. })));
    }

    #[test]
    fn test_nan_score_is_mapping_failure() {
        let result = interpret(&[f32::NAN, 0.1, 0.2, 0.3, 0.4], &LabelTable::insects());
        assert!(matches!(result, Err(Error::ResultMappingFailure { .. })));
    }

    #[test]
    fn test_two_stage_rounding_drops_fractional_percent() {
        assert_eq!(round_probability(0.7049), 0.70);
        let result = ClassificationResult::new("None", 0.7049);
        assert_eq!(result.percent(), 70);
        assert_eq!(result.to_string(), "Likely: None (70%)");
    }

    #[test]
    fn test_rounding_edges() {
        assert_eq!(ClassificationResult::new("Bee", 0.706).percent(), 71);
        assert_eq!(ClassificationResult::new("Bee", 0.004).percent(), 0);
        assert_eq!(ClassificationResult::new("Bee", 0.996).percent(), 100);
        assert_eq!(ClassificationResult::new("Bee", 1.0).percent(), 100);
    }

    #[test]
    fn test_rank_orders_descending_with_stable_ties() {
        let ranked = rank(&[0.2, 0.3, 0.2, 0.1, 0.2], &LabelTable::insects(), 4).unwrap();
        let labels: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Mosquito", "Bee", "None", "Tick"]);
    }

    #[test]
    fn test_rank_length_mismatch() {
        let result = rank(&[1.0], &LabelTable::insects(), 3);
        assert!(matches!(result, Err(Error::ResultMappingFailure { .. })));
    }

    #[test]
    fn test_classify_output_top_matches_ranked_head() {
        let classification =
            classify_output(&[0.05, 0.6, 0.05, 0.2, 0.1], &LabelTable::insects(), 3).unwrap();
        assert_eq!(classification.top.label, "Mosquito");
        assert_eq!(classification.ranked.len(), 3);
        assert_eq!(classification.ranked[0], classification.top);
        assert_eq!(classification.ranked[1].label, "Spider");
    }

    #[test]
    fn test_signed_zero_tie_keeps_top_at_ranked_head() {
        let classification =
            classify_output(&[-0.0, 0.0, 0.0, 0.0, 0.0], &LabelTable::insects(), 3).unwrap();
        assert_eq!(classification.top.label, "Bee");
        assert_eq!(classification.ranked[0], classification.top);
        let labels: Vec<&str> = classification.ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Bee", "Mosquito", "None"]);
    }
}
