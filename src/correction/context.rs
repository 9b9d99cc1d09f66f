//! Context-based correction of anomalously rare tokens using a masked-token
//! predictor.
//!
//! Works sentence by sentence: tokens whose general-language frequency is
//! below the rarity threshold are masked and the model is asked for ranked
//! fillers. Accepted fillers are substituted in place, so later tokens in
//! the same sentence are judged against the partially corrected sentence.
//! Every failure path degrades to leaving the affected token or sentence
//! unchanged.

use std::sync::Arc;

use tracing::debug;

use crate::correction::casing::preserve_case_and_punctuation;
use crate::correction::types::CorrectionRecord;
use crate::correction::{CorrectionStage, StagePass};
use crate::error::CorrectionError;
use crate::frequency::WordFrequency;
use crate::model::MaskedPredictor;

/// Sentences shorter than this carry too little context to judge a token.
const MIN_SENTENCE_TOKENS: usize = 3;
const MAX_ALTERNATIVES: usize = 2;

pub(crate) struct ContextStage {
    predictor: Arc<dyn MaskedPredictor>,
    frequency: Option<Arc<WordFrequency>>,
    rarity_threshold: f64,
}

impl ContextStage {
    pub(crate) fn new(
        predictor: Arc<dyn MaskedPredictor>,
        frequency: Option<Arc<WordFrequency>>,
        rarity_threshold: f64,
    ) -> Self {
        Self {
            predictor,
            frequency,
            rarity_threshold,
        }
    }

    /// A prediction is usable only when it looks like a word: purely
    /// alphabetic and longer than one character.
    fn acceptable(token: &str) -> bool {
        token.chars().count() > 1 && token.chars().all(|c| c.is_alphabetic())
    }

    fn correct_sentence(
        &self,
        words: &mut Vec<String>,
        frequency: &WordFrequency,
        token_offset: usize,
        records: &mut Vec<CorrectionRecord>,
    ) {
        for i in 0..words.len() {
            let word = words[i].clone();
            let freq = frequency.frequency(&word.to_lowercase());
            if freq >= self.rarity_threshold || word.chars().count() <= 2 {
                continue;
            }

            match self.predictor.predict_masked(words, i) {
                Ok(predictions) => {
                    let Some(best) = predictions.first() else {
                        continue;
                    };
                    if !Self::acceptable(&best.token) {
                        continue;
                    }

                    let corrected = preserve_case_and_punctuation(&word, &best.token);
                    let alternatives: Vec<String> = predictions
                        .iter()
                        .skip(1)
                        .take(MAX_ALTERNATIVES)
                        .map(|p| p.token.clone())
                        .collect();
                    debug!(
                        "context rewrite {} -> {} (confidence {:.3})",
                        word, corrected, best.score
                    );
                    records.push(CorrectionRecord::context_prediction(
                        token_offset + i,
                        word,
                        corrected.clone(),
                        best.score,
                        alternatives,
                    ));
                    words[i] = corrected;
                }
                Err(e) => {
                    debug!("masked prediction failed for token {}: {}", token_offset + i, e);
                }
            }
        }
    }
}

impl CorrectionStage for ContextStage {
    fn name(&self) -> &'static str {
        "context_prediction"
    }

    fn apply(&self, text: &str) -> Result<StagePass, CorrectionError> {
        let mut records = Vec::new();
        let mut corrected_sentences = Vec::new();
        let mut token_offset = 0;

        for raw_sentence in text.split('.') {
            let sentence = raw_sentence.trim();
            if sentence.is_empty() {
                continue;
            }

            let mut words: Vec<String> =
                sentence.split_whitespace().map(str::to_string).collect();
            let sentence_tokens = words.len();

            if sentence_tokens >= MIN_SENTENCE_TOKENS {
                // Without a frequency table there is no rarity signal, so
                // every token passes unexamined.
                if let Some(frequency) = &self.frequency {
                    self.correct_sentence(&mut words, frequency, token_offset, &mut records);
                }
            }

            corrected_sentences.push(words.join(" "));
            token_offset += sentence_tokens;
        }

        let mut corrected_text = corrected_sentences.join(". ");
        if !corrected_text.ends_with('.') && text.ends_with('.') {
            corrected_text.push('.');
        }

        Ok(StagePass {
            text: corrected_text,
            records,
        })
    }
}
