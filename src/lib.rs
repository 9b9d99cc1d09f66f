//! Multi-stage correction of raw OCR transcriptions.
//!
//! OCR engines garble text in characteristic ways: confusable character
//! sequences (`rn` read as `m`), out-of-vocabulary tokens, and words that
//! only context can repair. This crate chains independent correction
//! strategies over a single recognized-text string and returns the corrected
//! string plus an auditable trail of every change:
//!
//! 1. confusion-pattern rewriting, validated against a dictionary
//! 2. dictionary spell correction for unknown tokens
//! 3. fuzzy matching against a curated reference vocabulary
//! 4. optional masked-token context prediction for anomalously rare words
//!
//! ```no_run
//! use ocr_fixer::{Config, OcrCorrector};
//!
//! let corrector = OcrCorrector::new(&Config::default());
//! let outcome = corrector.correct("Dear freind, I will nver forget yu.")?;
//! println!("{} ({} corrections)", outcome.corrected_text, outcome.corrections.len());
//! # Ok::<(), ocr_fixer::CorrectionError>(())
//! ```
//!
//! The corrector is built once per process; capabilities that fail to load
//! (dictionary, frequency table, context model) disable their stage without
//! failing startup, and a built corrector is read-only, so it can serve
//! concurrent runs.

pub mod config;
pub mod correction;
pub mod dictionary;
pub mod error;
pub mod frequency;
pub mod model;

pub use config::Config;
pub use correction::{
    correction_stats, Capabilities, CorrectionMethod, CorrectionOutcome, CorrectionRecord,
    CorrectionStats, OcrCorrector,
};
pub use error::CorrectionError;
pub use model::{MaskedPredictor, OllamaMaskFiller, Prediction};
