//! Confusion-pattern correction for character sequences OCR engines
//! routinely misread.

use std::sync::Arc;

use tracing::debug;

use crate::correction::types::CorrectionRecord;
use crate::correction::{CorrectionStage, StagePass};
use crate::dictionary::SpellDictionary;
use crate::error::CorrectionError;

/// Ordered (seen, intended) confusion pairs. Order matters: the first pattern
/// that yields a dictionary word wins for a token.
const CONFUSION_PATTERNS: &[(&str, &str)] = &[
    ("rn", "m"),
    ("cl", "d"),
    ("li", "h"),
    ("vv", "w"),
    ("nn", "m"),
    ("1", "l"),
    ("0", "O"),
    ("5", "S"),
    ("8", "B"),
    ("|", "I"),
    ("ii", "n"),
    ("oi", "a"),
    ("ai", "w"),
];

/// Rewrites tokens whose lower-cased form contains a known confusion pattern,
/// but only when the rewritten token is a dictionary word. Without a
/// dictionary the stage still runs and accepts nothing: pattern rewriting is
/// never applied unvalidated.
pub(crate) struct PatternStage {
    dictionary: Option<Arc<SpellDictionary>>,
}

impl PatternStage {
    pub(crate) fn new(dictionary: Option<Arc<SpellDictionary>>) -> Self {
        Self { dictionary }
    }

    fn correct_token(&self, token: &str) -> Option<(String, String)> {
        let dictionary = self.dictionary.as_ref()?;
        let lowered = token.to_lowercase();
        for (seen, intended) in CONFUSION_PATTERNS {
            if lowered.contains(seen) {
                let candidate = lowered.replace(seen, intended);
                if dictionary.is_known(&candidate) {
                    return Some((candidate, format!("{} → {}", seen, intended)));
                }
            }
        }
        None
    }
}

impl CorrectionStage for PatternStage {
    fn name(&self) -> &'static str {
        "pattern_matching"
    }

    fn apply(&self, text: &str) -> Result<StagePass, CorrectionError> {
        let mut records = Vec::new();
        let mut corrected_tokens = Vec::new();

        for (position, token) in text.split_whitespace().enumerate() {
            match self.correct_token(token) {
                Some((corrected, pattern)) => {
                    debug!("pattern rewrite {} -> {} ({})", token, corrected, pattern);
                    records.push(CorrectionRecord::pattern_matching(
                        position,
                        token.to_string(),
                        corrected.clone(),
                        pattern,
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
