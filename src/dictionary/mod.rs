//! Known-word dictionary backed by a "word count" frequency list.
//!
//! Provides the two operations the pipeline needs: exact membership checks
//! (is this token a word we know?) and ranked correction candidates for
//! unknown tokens, ordered by edit distance and then corpus frequency.

use std::fs;

use symspell::{SymSpell, SymSpellBuilder, UnicodeStringStrategy, Verbosity};
use tracing::debug;

use crate::config::DictionarySettings;
use crate::error::CorrectionError;

/// Embedded frequency list used when no dictionary path is configured.
/// Format: one "word count" pair per line, counts descending.
pub(crate) static EMBEDDED_WORDS: &str = include_str!("../../data/words.txt");

static EMBEDDED_LABEL: &str = "<embedded>";

/// Parse "word count" lines, skipping blanks and comments.
pub(crate) fn word_count_lines(corpus: &str) -> impl Iterator<Item = (&str, u64)> {
    corpus.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut parts = line.split_whitespace();
        let word = parts.next()?;
        let count = parts.next()?.parse::<u64>().ok()?;
        Some((word, count))
    })
}

pub struct SpellDictionary {
    symspell: SymSpell<UnicodeStringStrategy>,
    max_edit_distance: i64,
    term_count: usize,
    source: String,
}

impl SpellDictionary {
    /// Load the dictionary named by the settings: a frequency-list file when a
    /// path is configured, the embedded list otherwise.
    pub fn load(settings: &DictionarySettings) -> Result<Self, CorrectionError> {
        match &settings.path {
            Some(path) => {
                let corpus =
                    fs::read_to_string(path).map_err(|e| CorrectionError::DictionaryLoad {
                        path: path.display().to_string(),
                        details: e.to_string(),
                    })?;
                Self::from_corpus(&corpus, settings.max_edit_distance, &path.display().to_string())
            }
            None => Self::from_corpus(EMBEDDED_WORDS, settings.max_edit_distance, EMBEDDED_LABEL),
        }
    }

    /// Build a dictionary from in-memory "word count" lines.
    pub fn from_corpus(
        corpus: &str,
        max_edit_distance: i64,
        source: &str,
    ) -> Result<Self, CorrectionError> {
        let mut symspell: SymSpell<UnicodeStringStrategy> = SymSpellBuilder::default()
            .max_dictionary_edit_distance(max_edit_distance)
            .prefix_length(7)
            .build()
            .map_err(|e| CorrectionError::DictionaryLoad {
                path: source.to_string(),
                details: e.to_string(),
            })?;

        let mut term_count = 0;
        for (word, count) in word_count_lines(corpus) {
            let line = format!("{} {}", word.to_lowercase(), count);
            if symspell.load_dictionary_line(&line, 0, 1, " ") {
                term_count += 1;
            }
        }

        if term_count == 0 {
            return Err(CorrectionError::DictionaryLoad {
                path: source.to_string(),
                details: "no usable word/count entries".to_string(),
            });
        }

        debug!("dictionary loaded: {} terms from {}", term_count, source);

        Ok(Self {
            symspell,
            max_edit_distance,
            term_count,
            source: source.to_string(),
        })
    }

    /// Exact membership check, case-insensitive.
    pub fn is_known(&self, word: &str) -> bool {
        let needle = word.to_lowercase();
        if needle.is_empty() {
            return false;
        }
        !self.symspell.lookup(&needle, Verbosity::Top, 0).is_empty()
    }

    /// Ranked correction candidates for an unknown token: all closest-distance
    /// matches within the configured edit distance, most frequent first.
    pub fn candidates(&self, word: &str) -> Vec<String> {
        let needle = word.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.symspell
            .lookup(&needle, Verbosity::Closest, self.max_edit_distance)
            .into_iter()
            .map(|suggestion| suggestion.term)
            .collect()
    }

    pub fn term_count(&self) -> usize {
        self.term_count
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
