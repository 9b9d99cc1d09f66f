//! Relative word-frequency lookup for the context stage's rarity gate.
//!
//! Backed by the same "word count" list format as the dictionary; a word's
//! frequency is its count divided by the corpus total, and words missing
//! from the table score 0.0 (maximally rare).

use std::collections::HashMap;
use std::fs;

use tracing::debug;

use crate::config::FrequencySettings;
use crate::dictionary::{word_count_lines, EMBEDDED_WORDS};
use crate::error::CorrectionError;

pub struct WordFrequency {
    counts: HashMap<String, u64>,
    total: f64,
}

impl WordFrequency {
    pub fn load(settings: &FrequencySettings) -> Result<Self, CorrectionError> {
        match &settings.path {
            Some(path) => {
                let corpus =
                    fs::read_to_string(path).map_err(|e| CorrectionError::FrequencyLoad {
                        path: path.display().to_string(),
                        details: e.to_string(),
                    })?;
                Self::from_corpus(&corpus, &path.display().to_string())
            }
            None => Self::from_corpus(EMBEDDED_WORDS, "<embedded>"),
        }
    }

    pub fn from_corpus(corpus: &str, source: &str) -> Result<Self, CorrectionError> {
        let mut counts = HashMap::new();
        let mut total = 0u64;
        for (word, count) in word_count_lines(corpus) {
            total += count;
            counts.insert(word.to_lowercase(), count);
        }

        if counts.is_empty() {
            return Err(CorrectionError::FrequencyLoad {
                path: source.to_string(),
                details: "no usable word/count entries".to_string(),
            });
        }

        debug!("frequency table loaded: {} terms from {}", counts.len(), source);

        Ok(Self {
            counts,
            total: total as f64,
        })
    }

    /// Relative frequency of a word in [0, 1]; 0.0 for unknown words.
    pub fn frequency(&self, word: &str) -> f64 {
        self.counts
            .get(&word.to_lowercase())
            .map(|count| *count as f64 / self.total)
            .unwrap_or(0.0)
    }

    pub fn term_count(&self) -> usize {
        self.counts.len()
    }
}
