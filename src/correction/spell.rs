//! Dictionary-backed spell correction for tokens the dictionary does not
//! recognize.

use std::sync::Arc;

use tracing::debug;

use crate::correction::casing::preserve_case_and_punctuation;
use crate::correction::types::CorrectionRecord;
use crate::correction::{CorrectionStage, StagePass};
use crate::dictionary::SpellDictionary;
use crate::error::CorrectionError;

const MAX_SUGGESTIONS: usize = 3;

/// Replaces unknown tokens with the dictionary's best candidate, preserving
/// the original token's case and trailing punctuation. Tokens whose lookup
/// key is empty (pure punctuation or numbers) or already known pass through.
pub(crate) struct SpellStage {
    dictionary: Arc<SpellDictionary>,
}

impl SpellStage {
    pub(crate) fn new(dictionary: Arc<SpellDictionary>) -> Self {
        Self { dictionary }
    }
}

/// Alphabetic-only lower-cased lookup key for a token.
pub(crate) fn lookup_key(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

impl CorrectionStage for SpellStage {
    fn name(&self) -> &'static str {
        "spell_check"
    }

    fn apply(&self, text: &str) -> Result<StagePass, CorrectionError> {
        let mut records = Vec::new();
        let mut corrected_tokens = Vec::new();

        for (position, token) in text.split_whitespace().enumerate() {
            let key = lookup_key(token);
            if key.is_empty() || self.dictionary.is_known(&key) {
                corrected_tokens.push(token.to_string());
                continue;
            }

            let candidates = self.dictionary.candidates(&key);
            match candidates.first() {
                Some(best) => {
                    let corrected = preserve_case_and_punctuation(token, best);
                    debug!("spell rewrite {} -> {}", token, corrected);
                    records.push(CorrectionRecord::spell_check(
                        position,
                        token.to_string(),
                        corrected.clone(),
                        candidates.iter().take(MAX_SUGGESTIONS).cloned().collect(),
                    ));
                    corrected_tokens.push(corrected);
                }
                None => corrected_tokens.push(token.to_string()),
            }
        }

        Ok(StagePass {
            text: corrected_tokens.join(" "),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> Arc<SpellDictionary> {
        let corpus = "the 1000\ndear 900\nfriend 800\nwill 700\nnever 600\nforget 500\nyou 400\ni 300\n";
        Arc::new(SpellDictionary::from_corpus(corpus, 2, "test").unwrap())
    }

    #[test]
    fn test_unknown_token_replaced_with_first_candidate() {
        let stage = SpellStage::new(dictionary());
        let pass = stage.apply("freind").unwrap();
        assert_eq!(pass.text, "friend");
        assert_eq!(pass.records.len(), 1);
        assert_eq!(pass.records[0].original, "freind");
        assert_eq!(
            pass.records[0].suggestions.as_deref().and_then(|s| s.first().cloned()),
            Some("friend".to_string())
        );
    }

    #[test]
    fn test_case_and_punctuation_preserved() {
        let stage = SpellStage::new(dictionary());
        let pass = stage.apply("Freind,").unwrap();
        assert_eq!(pass.text, "Friend,");
    }

    #[test]
    fn test_known_tokens_pass_through() {
        let stage = SpellStage::new(dictionary());
        let pass = stage.apply("dear friend").unwrap();
        assert_eq!(pass.text, "dear friend");
        assert!(pass.records.is_empty());
    }

    #[test]
    fn test_punctuation_and_numeric_tokens_pass_through() {
        let stage = SpellStage::new(dictionary());
        let pass = stage.apply("... 1234 --").unwrap();
        assert_eq!(pass.text, "... 1234 --");
        assert!(pass.records.is_empty());
    }

    #[test]
    fn test_no_candidates_leaves_token_unchanged() {
        let stage = SpellStage::new(dictionary());
        let pass = stage.apply("xzqwvk").unwrap();
        assert_eq!(pass.text, "xzqwvk");
        assert!(pass.records.is_empty());
    }

    #[test]
    fn test_suggestions_capped_at_three() {
        let corpus = "bat 900\ncat 800\nhat 700\nmat 600\nrat 500\n";
        let stage = SpellStage::new(Arc::new(
            SpellDictionary::from_corpus(corpus, 2, "test").unwrap(),
        ));
        let pass = stage.apply("zat").unwrap();
        assert_eq!(pass.records.len(), 1);
        let suggestions = pass.records[0].suggestions.as_ref().unwrap();
        assert!(suggestions.len() <= 3);
        // Candidate order is dictionary-defined: distance, then frequency.
        assert_eq!(suggestions[0], "bat");
    }

    #[test]
    fn test_lookup_key_strips_non_alphabetic() {
        assert_eq!(lookup_key("Teh,"), "teh");
        assert_eq!(lookup_key("1234"), "");
        assert_eq!(lookup_key("don't"), "dont");
    }
}
