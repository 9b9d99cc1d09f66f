use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which pipeline stage produced a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMethod {
    PatternMatching,
    SpellCheck,
    FuzzyMatching,
    ContextPrediction,
}

impl CorrectionMethod {
    pub fn tag(&self) -> &'static str {
        match self {
            CorrectionMethod::PatternMatching => "pattern_matching",
            CorrectionMethod::SpellCheck => "spell_check",
            CorrectionMethod::FuzzyMatching => "fuzzy_matching",
            CorrectionMethod::ContextPrediction => "context_prediction",
        }
    }
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One applied token-level change, immutable once appended to a run's trail.
///
/// The metadata fields are populated per method and omitted from the
/// serialized record when absent, so each method's records serialize with
/// exactly its own fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Token index in whole-text token order (see the aggregator docs).
    pub position: usize,
    pub original: String,
    pub corrected: String,
    pub method: CorrectionMethod,

    /// Pattern stage: human-readable "seen → intended" description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Spell stage: up to the first 3 dictionary candidates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// Fuzzy stage: integer similarity score in 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<i64>,
    /// Context stage: model score for the chosen filler, in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Context stage: up to 2 runner-up fillers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
}

impl CorrectionRecord {
    fn base(
        position: usize,
        original: String,
        corrected: String,
        method: CorrectionMethod,
    ) -> Self {
        Self {
            position,
            original,
            corrected,
            method,
            pattern: None,
            suggestions: None,
            similarity_score: None,
            confidence: None,
            alternatives: None,
        }
    }

    pub fn pattern_matching(
        position: usize,
        original: String,
        corrected: String,
        pattern: String,
    ) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::base(position, original, corrected, CorrectionMethod::PatternMatching)
        }
    }

    pub fn spell_check(
        position: usize,
        original: String,
        corrected: String,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            suggestions: Some(suggestions),
            ..Self::base(position, original, corrected, CorrectionMethod::SpellCheck)
        }
    }

    pub fn fuzzy_matching(
        position: usize,
        original: String,
        corrected: String,
        similarity_score: i64,
    ) -> Self {
        Self {
            similarity_score: Some(similarity_score),
            ..Self::base(position, original, corrected, CorrectionMethod::FuzzyMatching)
        }
    }

    pub fn context_prediction(
        position: usize,
        original: String,
        corrected: String,
        confidence: f64,
        alternatives: Vec<String>,
    ) -> Self {
        Self {
            confidence: Some(confidence),
            alternatives: Some(alternatives),
            ..Self::base(position, original, corrected, CorrectionMethod::ContextPrediction)
        }
    }
}

/// Result of one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    pub corrected_text: String,
    /// Stage order, then token order within a stage.
    pub corrections: Vec<CorrectionRecord>,
    /// Fraction of input tokens left unchanged; a crude proxy, not a
    /// calibrated probability.
    pub confidence: f64,
    /// Wall-clock seconds for the run.
    pub processing_time: f64,
    /// Distinct methods that actually produced corrections, in first-use order.
    pub methods_used: Vec<CorrectionMethod>,
}

/// Summary of a completed run's corrections by method.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionStats {
    pub total_corrections: usize,
    pub methods_used: usize,
    pub correction_breakdown: BTreeMap<String, usize>,
    pub most_used_method: Option<CorrectionMethod>,
}

/// Summarize a correction trail by method. Ties for most-used resolve to the
/// method that appeared first in the trail.
pub fn correction_stats(records: &[CorrectionRecord]) -> CorrectionStats {
    let mut ordered: Vec<(CorrectionMethod, usize)> = Vec::new();
    for record in records {
        match ordered.iter_mut().find(|(method, _)| *method == record.method) {
            Some(entry) => entry.1 += 1,
            None => ordered.push((record.method, 1)),
        }
    }

    let mut most_used_method = None;
    let mut best = 0;
    for (method, count) in &ordered {
        if *count > best {
            best = *count;
            most_used_method = Some(*method);
        }
    }

    CorrectionStats {
        total_corrections: records.len(),
        methods_used: ordered.len(),
        correction_breakdown: ordered
            .iter()
            .map(|(method, count)| (method.tag().to_string(), *count))
            .collect(),
        most_used_method,
    }
}
