//! The multi-stage correction pipeline.
//!
//! The aggregator drives the enabled stages in a fixed order, feeding each
//! stage's output text into the next and concatenating their correction
//! records. Which stages are enabled is decided once, when the corrector is
//! built: a capability whose resource failed to load simply leaves its stage
//! out of the list. After construction everything is read-only, so one
//! corrector can serve concurrent runs.

mod casing;
mod context;
mod fuzzy;
mod patterns;
mod spell;
mod types;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::dictionary::SpellDictionary;
use crate::error::CorrectionError;
use crate::frequency::WordFrequency;
use crate::model::{MaskedPredictor, OllamaMaskFiller};

use context::ContextStage;
use fuzzy::FuzzyStage;
use patterns::PatternStage;
use spell::SpellStage;

pub use types::{
    correction_stats, CorrectionMethod, CorrectionOutcome, CorrectionRecord, CorrectionStats,
};

/// One stage's output: the (possibly rewritten) text handed to the next
/// stage, plus the records for every change this stage made.
pub(crate) struct StagePass {
    pub(crate) text: String,
    pub(crate) records: Vec<CorrectionRecord>,
}

/// A correction strategy. Stages never mutate their input; they return a new
/// string and their own records, with token positions indexed against the
/// token sequence they were given.
pub(crate) trait CorrectionStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, text: &str) -> Result<StagePass, CorrectionError>;
}

/// Which correction methods this process can actually run. Populated once at
/// startup and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    /// Always available; without a dictionary the stage accepts no rewrites.
    pub pattern_matching: bool,
    pub spell_check: bool,
    pub fuzzy_matching: bool,
    pub word_frequency: bool,
    pub context_prediction: bool,
}

impl Capabilities {
    /// The method tags currently available, for status reporting.
    pub fn available_methods(&self) -> Vec<&'static str> {
        let mut methods = vec![CorrectionMethod::PatternMatching.tag()];
        if self.spell_check {
            methods.push(CorrectionMethod::SpellCheck.tag());
        }
        if self.fuzzy_matching {
            methods.push(CorrectionMethod::FuzzyMatching.tag());
        }
        if self.context_prediction {
            methods.push(CorrectionMethod::ContextPrediction.tag());
        }
        methods
    }
}

/// The correction pipeline: build once, run per transcription.
pub struct OcrCorrector {
    stages: Vec<Box<dyn CorrectionStage>>,
    capabilities: Capabilities,
}

impl OcrCorrector {
    /// Build the pipeline without a context model.
    pub fn new(config: &Config) -> Self {
        Self::build(config, None)
    }

    /// Build the pipeline with an injected masked-token predictor.
    pub fn with_predictor(config: &Config, predictor: Arc<dyn MaskedPredictor>) -> Self {
        Self::build(config, Some(predictor))
    }

    /// Build the pipeline, connecting to the configured Ollama server when
    /// the context stage is enabled. An unreachable server only disables
    /// that capability.
    pub fn from_config(config: &Config) -> Self {
        let predictor: Option<Arc<dyn MaskedPredictor>> = if config.context.enabled {
            match OllamaMaskFiller::connect(&config.context) {
                Ok(filler) => Some(Arc::new(filler)),
                Err(e) => {
                    warn!("⚠️ context model unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self::build(config, predictor)
    }

    fn build(config: &Config, predictor: Option<Arc<dyn MaskedPredictor>>) -> Self {
        let dictionary = if config.dictionary.enabled {
            match SpellDictionary::load(&config.dictionary) {
                Ok(dict) => {
                    info!(
                        "✅ dictionary ready: {} terms from {}",
                        dict.term_count(),
                        dict.source()
                    );
                    Some(Arc::new(dict))
                }
                Err(e) => {
                    warn!("⚠️ dictionary unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let frequency = if config.frequency.enabled {
            match WordFrequency::load(&config.frequency) {
                Ok(table) => {
                    info!("✅ word-frequency table ready: {} terms", table.term_count());
                    Some(Arc::new(table))
                }
                Err(e) => {
                    warn!("⚠️ word-frequency table unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let capabilities = Capabilities {
            pattern_matching: true,
            spell_check: dictionary.is_some(),
            fuzzy_matching: config.fuzzy.enabled,
            word_frequency: frequency.is_some(),
            context_prediction: predictor.is_some(),
        };

        let mut stages: Vec<Box<dyn CorrectionStage>> =
            vec![Box::new(PatternStage::new(dictionary.clone()))];
        if let Some(dict) = &dictionary {
            stages.push(Box::new(SpellStage::new(Arc::clone(dict))));
        }
        if config.fuzzy.enabled {
            stages.push(Box::new(FuzzyStage::new(config.fuzzy.similarity_threshold)));
        }
        if let Some(predictor) = predictor {
            info!("✅ context predictor installed: {}", predictor.name());
            stages.push(Box::new(ContextStage::new(
                predictor,
                frequency.clone(),
                config.context.rarity_threshold,
            )));
        }

        info!(
            "🎉 corrector ready with {} methods: {:?}",
            capabilities.available_methods().len(),
            capabilities.available_methods()
        );

        Self {
            stages,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Run every enabled stage over the text and assemble the outcome.
    ///
    /// The only error a caller sees is `EmptyInput`; a stage that fails mid-
    /// run degrades to "produced no changes" and the pipeline continues with
    /// the text accumulated so far, so the worst case is a pass-through of
    /// the input with zero corrections.
    pub fn correct(&self, text: &str) -> Result<CorrectionOutcome, CorrectionError> {
        let started = Instant::now();

        if text.trim().is_empty() {
            return Err(CorrectionError::EmptyInput);
        }

        let total_tokens = text.split_whitespace().count();
        let mut current = text.to_string();
        let mut corrections: Vec<CorrectionRecord> = Vec::new();

        for stage in &self.stages {
            match stage.apply(&current) {
                Ok(pass) => {
                    current = pass.text;
                    corrections.extend(pass.records);
                }
                Err(e) => {
                    warn!("{} stage failed, treating as no changes: {}", stage.name(), e);
                }
            }
        }

        let mut methods_used = Vec::new();
        for record in &corrections {
            if !methods_used.contains(&record.method) {
                methods_used.push(record.method);
            }
        }

        let confidence = confidence_for(total_tokens, corrections.len());
        let processing_time = started.elapsed().as_secs_f64();

        info!(
            "✅ applied {} corrections in {:.3}s (confidence {:.2})",
            corrections.len(),
            processing_time,
            confidence
        );

        Ok(CorrectionOutcome {
            corrected_text: current,
            corrections,
            confidence,
            processing_time,
            methods_used,
        })
    }
}

/// Fraction of input tokens left unchanged, floored at zero. A crude proxy:
/// more corrections imply lower confidence.
fn confidence_for(total_tokens: usize, corrections: usize) -> f64 {
    if total_tokens == 0 {
        return 1.0;
    }
    ((total_tokens as f64 - corrections as f64) / total_tokens as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MockMaskedPredictor, Prediction};

    fn default_corrector() -> OcrCorrector {
        OcrCorrector::new(&Config::default())
    }

    #[test]
    fn test_empty_input_fails_fast() {
        let corrector = default_corrector();
        let result = corrector.correct("   ");
        assert!(matches!(result, Err(CorrectionError::EmptyInput)));
    }

    #[test]
    fn test_end_to_end_letter_correction() {
        let corrector = default_corrector();
        let outcome = corrector.correct("Dear freind, I will nver forget yu.").unwrap();

        assert!(!outcome.corrections.is_empty());
        assert!(outcome.methods_used.contains(&CorrectionMethod::SpellCheck));
        assert!(outcome.corrected_text.contains("friend,"));
        assert!(outcome.corrected_text.contains("you."));
        assert!(outcome.confidence >= 0.0 && outcome.confidence <= 1.0);
        assert!(outcome.processing_time >= 0.0);
    }

    #[test]
    fn test_corrected_text_converges() {
        let corrector = default_corrector();
        let first = corrector.correct("Dear freind, I will nver forget yu.").unwrap();
        let second = corrector.correct(&first.corrected_text).unwrap();
        assert!(second.corrections.is_empty());
        assert_eq!(second.corrected_text, first.corrected_text);
    }

    #[test]
    fn test_clean_text_passes_through() {
        let corrector = default_corrector();
        let outcome = corrector.correct("Dear friend, I will never forget you.").unwrap();
        assert_eq!(outcome.corrected_text, "Dear friend, I will never forget you.");
        assert!(outcome.corrections.is_empty());
        assert_eq!(outcome.confidence, 1.0);
        assert!(outcome.methods_used.is_empty());
    }

    #[test]
    fn test_confidence_matches_token_fraction() {
        let corrector = default_corrector();
        let outcome = corrector.correct("Dear freind, I will nver forget yu.").unwrap();
        let total = 7.0;
        let expected = (total - outcome.corrections.len() as f64) / total;
        assert!((outcome.confidence - expected.max(0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_dictionary_contributes_no_records() {
        let mut config = Config::default();
        config.dictionary.enabled = false;
        let corrector = OcrCorrector::new(&config);

        assert!(!corrector.capabilities().spell_check);
        let outcome = corrector.correct("Dear freind, I will nver forget yu.").unwrap();
        assert!(!outcome.methods_used.contains(&CorrectionMethod::SpellCheck));
        assert!(!outcome.methods_used.contains(&CorrectionMethod::PatternMatching));
    }

    #[test]
    fn test_pattern_stage_feeds_spell_stage() {
        let corrector = default_corrector();
        let outcome = corrector.correct("the rnouse ran").unwrap();
        assert!(outcome.corrected_text.starts_with("the mouse"));
        assert!(outcome
            .methods_used
            .contains(&CorrectionMethod::PatternMatching));
        let record = &outcome.corrections[0];
        assert_eq!(record.pattern.as_deref(), Some("rn → m"));
    }

    #[test]
    fn test_context_stage_runs_last_with_mock_predictor() {
        let mut config = Config::default();
        config.dictionary.enabled = false;
        config.fuzzy.enabled = false;

        let mut mock = MockMaskedPredictor::new();
        mock.expect_name().return_const("mock");
        mock.expect_predict_masked().returning(|_, _| {
            Ok(vec![
                Prediction {
                    token: "written".to_string(),
                    score: 0.77,
                },
                Prediction {
                    token: "sent".to_string(),
                    score: 0.1,
                },
            ])
        });

        let corrector = OcrCorrector::with_predictor(&config, Arc::new(mock));
        assert!(corrector.capabilities().context_prediction);

        let outcome = corrector.correct("the word xqzweqz is here now.").unwrap();
        assert_eq!(outcome.corrected_text, "the word written is here now.");
        assert_eq!(outcome.corrections.len(), 1);
        let record = &outcome.corrections[0];
        assert_eq!(record.method, CorrectionMethod::ContextPrediction);
        assert_eq!(record.position, 2);
        assert_eq!(record.confidence, Some(0.77));
        assert_eq!(record.alternatives, Some(vec!["sent".to_string()]));
    }

    #[test]
    fn test_capability_report() {
        let corrector = default_corrector();
        let capabilities = corrector.capabilities();
        assert!(capabilities.pattern_matching);
        assert!(capabilities.spell_check);
        assert!(capabilities.fuzzy_matching);
        assert!(capabilities.word_frequency);
        assert!(!capabilities.context_prediction);
        assert_eq!(
            capabilities.available_methods(),
            vec!["pattern_matching", "spell_check", "fuzzy_matching"]
        );
    }

    #[test]
    fn test_stats_summarize_a_run() {
        let corrector = default_corrector();
        let outcome = corrector.correct("Dear freind, I will nver forget yu.").unwrap();
        let stats = correction_stats(&outcome.corrections);
        assert_eq!(stats.total_corrections, outcome.corrections.len());
        assert_eq!(stats.most_used_method, Some(CorrectionMethod::SpellCheck));
        assert!(stats.correction_breakdown["spell_check"] >= 1);
    }

    #[test]
    fn test_failing_stage_degrades_to_no_changes() {
        struct FailingStage;
        impl CorrectionStage for FailingStage {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn apply(&self, _text: &str) -> Result<StagePass, CorrectionError> {
                Err(CorrectionError::Prediction {
                    details: "backend exploded".to_string(),
                })
            }
        }

        let corrector = OcrCorrector {
            stages: vec![Box::new(FailingStage)],
            capabilities: Capabilities {
                pattern_matching: true,
                spell_check: false,
                fuzzy_matching: false,
                word_frequency: false,
                context_prediction: false,
            },
        };

        let outcome = corrector.correct("some perfectly fine text").unwrap();
        assert_eq!(outcome.corrected_text, "some perfectly fine text");
        assert!(outcome.corrections.is_empty());
        assert_eq!(outcome.confidence, 1.0);
    }

    #[test]
    fn test_outcome_serializes_to_contract_shape() {
        let corrector = default_corrector();
        let outcome = corrector.correct("Dear freind, I will nver forget yu.").unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("corrected_text").is_some());
        assert!(json.get("corrections").is_some());
        assert!(json.get("confidence").is_some());
        assert!(json.get("processing_time").is_some());
        assert!(json["methods_used"]
            .as_array()
            .unwrap()
            .iter()
            .all(|m| m == "spell_check"
                || m == "pattern_matching"
                || m == "fuzzy_matching"
                || m == "context_prediction"));
    }
}
