//! Injected context-model interface for masked-token prediction.
//!
//! The pipeline only ever sees the `MaskedPredictor` trait; the bundled
//! implementation prompts an Ollama server for ranked fillers, and tests
//! substitute a mock. Construction is best-effort: a server that cannot be
//! reached disables the context capability instead of failing startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ContextSettings;
use crate::error::CorrectionError;

/// One ranked filler for a masked token position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub token: String,
    /// Model score in [0, 1], higher is more probable.
    pub score: f64,
}

/// A model that can propose fillers for one masked position in a token
/// sequence, most probable first.
#[cfg_attr(test, mockall::automock)]
pub trait MaskedPredictor: Send + Sync {
    fn predict_masked(
        &self,
        tokens: &[String],
        mask_index: usize,
    ) -> Result<Vec<Prediction>, CorrectionError>;

    /// Name of this predictor for logging.
    fn name(&self) -> &'static str;
}

const MASK_TOKEN: &str = "[MASK]";
const MAX_PREDICTIONS: usize = 3;

/// Masked-token prediction over an Ollama chat model.
pub struct OllamaMaskFiller {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl OllamaMaskFiller {
    /// Connect to the configured Ollama server, probing it once so an
    /// unreachable server is reported at startup rather than mid-run.
    pub fn connect(settings: &ContextSettings) -> Result<Self, CorrectionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let base_url = settings.ollama_url.trim_end_matches('/').to_string();
        let probe = client.get(format!("{}/api/tags", base_url)).send()?;
        if !probe.status().is_success() {
            return Err(CorrectionError::Prediction {
                details: format!("Ollama probe returned {}", probe.status()),
            });
        }

        info!("context model ready: {} at {}", settings.model, base_url);

        Ok(Self {
            client,
            base_url,
            model: settings.model.clone(),
        })
    }

    fn build_prompt(masked_sentence: &str) -> String {
        format!(
            "One word in this sentence was garbled and replaced with {mask}:\n\
             \n\
             \"{sentence}\"\n\
             \n\
             Respond with JSON only, no prose: {{\"predictions\": [{{\"token\": \"word\", \
             \"score\": 0.9}}]}} listing the {count} most likely replacement words, \
             highest score first. Scores are probabilities between 0 and 1.",
            mask = MASK_TOKEN,
            sentence = masked_sentence,
            count = MAX_PREDICTIONS,
        )
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct RankedFillers {
    predictions: Vec<Prediction>,
}

impl MaskedPredictor for OllamaMaskFiller {
    fn predict_masked(
        &self,
        tokens: &[String],
        mask_index: usize,
    ) -> Result<Vec<Prediction>, CorrectionError> {
        if mask_index >= tokens.len() {
            return Err(CorrectionError::Prediction {
                details: format!(
                    "mask index {} out of range for {} tokens",
                    mask_index,
                    tokens.len()
                ),
            });
        }

        let masked_sentence = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if i == mask_index {
                    MASK_TOKEN
                } else {
                    token.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        debug!("requesting fillers for: {}", masked_sentence);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": Self::build_prompt(&masked_sentence),
            "stream": false,
            "format": "json",
        });

        let response: GenerateResponse = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let fillers: RankedFillers =
            serde_json::from_str(&response.response).map_err(|e| CorrectionError::Prediction {
                details: format!("unparseable model response: {}", e),
            })?;

        let mut predictions = fillers.predictions;
        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        predictions.truncate(MAX_PREDICTIONS);
        Ok(predictions)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_masked_sentence() {
        let prompt = OllamaMaskFiller::build_prompt("I [MASK] you");
        assert!(prompt.contains("I [MASK] you"));
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn test_ranked_fillers_parse() {
        let raw = r#"{"predictions": [{"token": "miss", "score": 0.8}, {"token": "see", "score": 0.1}]}"#;
        let fillers: RankedFillers = serde_json::from_str(raw).unwrap();
        assert_eq!(fillers.predictions.len(), 2);
        assert_eq!(fillers.predictions[0].token, "miss");
    }

    #[test]
    fn test_mock_predictor_round_trip() {
        let mut mock = MockMaskedPredictor::new();
        mock.expect_predict_masked().returning(|_, _| {
            Ok(vec![Prediction {
                token: "letter".to_string(),
                score: 0.9,
            }])
        });
        mock.expect_name().return_const("mock");

        let tokens: Vec<String> = ["a", "garbled", "word"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let predictions = mock.predict_masked(&tokens, 1).unwrap();
        assert_eq!(predictions[0].token, "letter");
        assert_eq!(mock.name(), "mock");
    }
}
