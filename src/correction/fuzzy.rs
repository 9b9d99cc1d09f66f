//! Fuzzy matching of tokens against a curated reference vocabulary.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use strsim::jaro_winkler;
use tracing::debug;

use crate::correction::casing::preserve_case_and_punctuation;
use crate::correction::spell::lookup_key;
use crate::correction::types::CorrectionRecord;
use crate::correction::{CorrectionStage, StagePass};
use crate::error::CorrectionError;

/// Curated reference vocabulary: common English words plus the
/// correspondence-domain terms scanned letters keep producing. Maintained in
/// sections, deduplicated at first use.
const CURATED_WORDS: &[&str] = &[
    // Common English
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "she",
    "or", "an", "will", "my", "one", "all", "would", "there", "their", "what", "so", "up", "out",
    "if", "about", "who", "get", "which", "go", "me", "when", "make", "can", "like", "time",
    "no", "just", "him", "know", "take", "people", "into", "year", "your", "good", "some",
    "could", "them", "see", "other", "than", "then", "now", "look", "only", "come", "its",
    "over", "think", "also", "back", "after", "use", "two", "how", "our", "work", "first",
    "well", "way", "even", "new", "want", "because", "any", "these", "give", "day", "most", "us",
    // Correspondence domain
    "dear", "future", "worry", "things", "happen", "meant", "stop", "comparing", "past",
    "present", "left", "behind", "reason", "forward", "confidently", "developing", "right",
    "keep", "smiling", "small", "worries", "concerns", "forgotten", "years", "time", "thankful",
    "blessings", "grace", "life", "each", "seems", "falling", "apart", "takes", "destruction",
    "build", "tell", "people", "love", "matter", "many", "grateful", "placed", "atmosphere",
    "seek", "knowledge", "truths", "learn", "invest", "moments", "memories", "wrong", "nice",
    "house", "clothes", "made", "trips", "taken", "where", "went", "those", "hold", "most",
    "above", "strive", "yourself", "find", "really", "person", "never", "stand", "someone",
    "else", "ground", "hill", "start", "look", "around", "roots", "have", "seen", "pounds",
    "lighter", "better", "job", "place", "someday", "moment", "live", "regrets", "choices",
    "yours", "sincerely", "friend", "friends", "forget", "letter", "letters", "remember",
    "miss", "hope", "happy", "thank", "thanks", "write", "written", "mouse", "ran",
];

static REFERENCE_VOCABULARY: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut seen = HashSet::new();
    CURATED_WORDS
        .iter()
        .copied()
        .filter(|word| seen.insert(*word))
        .collect()
});

/// Integer 0-100 similarity between a cleaned token and a vocabulary word.
fn similarity(a: &str, b: &str) -> i64 {
    (jaro_winkler(a, b) * 100.0).round() as i64
}

/// Replaces tokens that score strictly above the threshold against their
/// single best vocabulary match. Tokens of length <= 2, tokens whose best
/// match is themselves, and tokens below the threshold pass through.
pub(crate) struct FuzzyStage {
    vocabulary: Vec<&'static str>,
    threshold: i64,
}

impl FuzzyStage {
    pub(crate) fn new(threshold: i64) -> Self {
        Self {
            vocabulary: REFERENCE_VOCABULARY.clone(),
            threshold,
        }
    }

    #[cfg(test)]
    fn with_vocabulary(vocabulary: Vec<&'static str>, threshold: i64) -> Self {
        Self {
            vocabulary,
            threshold,
        }
    }

    /// Best vocabulary match and its score; ties keep the earliest entry.
    fn best_match(&self, cleaned: &str) -> Option<(&'static str, i64)> {
        let mut best: Option<(&'static str, i64)> = None;
        for word in self.vocabulary.iter().copied() {
            let score = similarity(cleaned, word);
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((word, score));
            }
        }
        best
    }
}

impl CorrectionStage for FuzzyStage {
    fn name(&self) -> &'static str {
        "fuzzy_matching"
    }

    fn apply(&self, text: &str) -> Result<StagePass, CorrectionError> {
        let mut records = Vec::new();
        let mut corrected_tokens = Vec::new();

        for (position, token) in text.split_whitespace().enumerate() {
            let cleaned = lookup_key(token);
            if cleaned.chars().count() <= 2 {
                corrected_tokens.push(token.to_string());
                continue;
            }

            match self.best_match(&cleaned) {
                Some((matched, score)) if score > self.threshold && matched != cleaned => {
                    let corrected = preserve_case_and_punctuation(token, matched);
                    debug!("fuzzy rewrite {} -> {} (score {})", token, corrected, score);
                    records.push(CorrectionRecord::fuzzy_matching(
                        position,
                        token.to_string(),
                        corrected.clone(),
                        score,
                    ));
                    corrected_tokens.push(corrected);
                }
                _ => corrected_tokens.push(token.to_string()),
            }
        }

        Ok(StagePass {
            text: corrected_tokens.join(" "),
            records,
        })
    }
}
