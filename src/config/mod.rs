use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CorrectionError;

/// Tunables for the correction pipeline.
///
/// Every field has a working default; `load` is best-effort and falls back
/// to defaults for anything missing or malformed, so a broken config file
/// can never prevent the corrector from starting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub dictionary: DictionarySettings,
    pub fuzzy: FuzzySettings,
    pub frequency: FrequencySettings,
    pub context: ContextSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DictionarySettings {
    pub enabled: bool,
    /// Optional "word count" frequency list; the embedded list is used when unset.
    pub path: Option<PathBuf>,
    pub max_edit_distance: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuzzySettings {
    pub enabled: bool,
    /// Integer 0-100; matches must score strictly above this to be applied.
    pub similarity_threshold: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrequencySettings {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContextSettings {
    pub enabled: bool,
    /// Tokens with relative frequency below this are candidates for masked prediction.
    pub rarity_threshold: f64,
    pub ollama_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for DictionarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            max_edit_distance: 2,
        }
    }
}

impl Default for FuzzySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: 85,
        }
    }
}

impl Default for FrequencySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            rarity_threshold: 1e-6,
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: DictionarySettings::default(),
            fuzzy: FuzzySettings::default(),
            frequency: FrequencySettings::default(),
            context: ContextSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for
    /// anything missing or unparseable.
    pub fn load(path: &Path) -> Self {
        let mut config = Config::default();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return config,
        };

        let doc = match contents.parse::<toml_edit::DocumentMut>() {
            Ok(doc) => doc,
            Err(e) => {
                warn!("ignoring malformed config {}: {}", path.display(), e);
                return config;
            }
        };

        if let Some(table) = doc.get("dictionary").and_then(|i| i.as_table()) {
            if let Some(enabled) = table.get("enabled").and_then(|v| v.as_bool()) {
                config.dictionary.enabled = enabled;
            }
            if let Some(dict_path) = table.get("path").and_then(|v| v.as_str()) {
                config.dictionary.path = Some(PathBuf::from(dict_path));
            }
            if let Some(distance) = table.get("max_edit_distance").and_then(|v| v.as_integer()) {
                config.dictionary.max_edit_distance = distance;
            }
        }

        if let Some(table) = doc.get("fuzzy").and_then(|i| i.as_table()) {
            if let Some(enabled) = table.get("enabled").and_then(|v| v.as_bool()) {
                config.fuzzy.enabled = enabled;
            }
            if let Some(threshold) = table.get("similarity_threshold").and_then(|v| v.as_integer()) {
                config.fuzzy.similarity_threshold = threshold;
            }
        }

        if let Some(table) = doc.get("frequency").and_then(|i| i.as_table()) {
            if let Some(enabled) = table.get("enabled").and_then(|v| v.as_bool()) {
                config.frequency.enabled = enabled;
            }
            if let Some(freq_path) = table.get("path").and_then(|v| v.as_str()) {
                config.frequency.path = Some(PathBuf::from(freq_path));
            }
        }

        if let Some(table) = doc.get("context").and_then(|i| i.as_table()) {
            if let Some(enabled) = table.get("enabled").and_then(|v| v.as_bool()) {
                config.context.enabled = enabled;
            }
            if let Some(threshold) = table.get("rarity_threshold").and_then(|v| v.as_float()) {
                config.context.rarity_threshold = threshold;
            }
            if let Some(url) = table.get("ollama_url").and_then(|v| v.as_str()) {
                config.context.ollama_url = url.to_string();
            }
            if let Some(model) = table.get("model").and_then(|v| v.as_str()) {
                config.context.model = model.to_string();
            }
            if let Some(timeout) = table.get("timeout_secs").and_then(|v| v.as_integer()) {
                config.context.timeout_secs = timeout.max(1) as u64;
            }
        }

        config
    }

    pub fn save(&self, path: &Path) -> Result<(), CorrectionError> {
        let mut doc = toml_edit::DocumentMut::new();

        doc["dictionary"]["enabled"] = toml_edit::value(self.dictionary.enabled);
        if let Some(dict_path) = &self.dictionary.path {
            doc["dictionary"]["path"] = toml_edit::value(dict_path.to_string_lossy().to_string());
        }
        doc["dictionary"]["max_edit_distance"] = toml_edit::value(self.dictionary.max_edit_distance);

        doc["fuzzy"]["enabled"] = toml_edit::value(self.fuzzy.enabled);
        doc["fuzzy"]["similarity_threshold"] = toml_edit::value(self.fuzzy.similarity_threshold);

        doc["frequency"]["enabled"] = toml_edit::value(self.frequency.enabled);
        if let Some(freq_path) = &self.frequency.path {
            doc["frequency"]["path"] = toml_edit::value(freq_path.to_string_lossy().to_string());
        }

        doc["context"]["enabled"] = toml_edit::value(self.context.enabled);
        doc["context"]["rarity_threshold"] = toml_edit::value(self.context.rarity_threshold);
        doc["context"]["ollama_url"] = toml_edit::value(self.context.ollama_url.clone());
        doc["context"]["model"] = toml_edit::value(self.context.model.clone());
        doc["context"]["timeout_secs"] = toml_edit::value(self.context.timeout_secs as i64);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, doc.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.dictionary.enabled);
        assert_eq!(config.dictionary.max_edit_distance, 2);
        assert_eq!(config.fuzzy.similarity_threshold, 85);
        assert_eq!(config.context.rarity_threshold, 1e-6);
        assert!(!config.context.enabled);
    }

    #[test]
    fn test_config_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.fuzzy.similarity_threshold = 90;
        config.dictionary.path = Some(PathBuf::from("/opt/words.txt"));
        config.context.enabled = true;
        config.context.model = "mistral".to_string();

        config.save(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = Config::load(&config_path);
        assert_eq!(loaded.fuzzy.similarity_threshold, 90);
        assert_eq!(loaded.dictionary.path, Some(PathBuf::from("/opt/words.txt")));
        assert!(loaded.context.enabled);
        assert_eq!(loaded.context.model, "mistral");
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let loaded = Config::load(Path::new("/nonexistent/config.toml"));
        assert_eq!(loaded.fuzzy.similarity_threshold, 85);
    }

    #[test]
    fn test_load_malformed_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "not [valid toml").unwrap();

        let loaded = Config::load(&config_path);
        assert_eq!(loaded.dictionary.max_edit_distance, 2);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[fuzzy]\nsimilarity_threshold = 70\n").unwrap();

        let loaded = Config::load(&config_path);
        assert_eq!(loaded.fuzzy.similarity_threshold, 70);
        assert!(loaded.dictionary.enabled);
        assert_eq!(loaded.context.ollama_url, "http://localhost:11434");
    }
}
