// Configuration Storage Service
// Reads the JSON config file and layers environment overrides on top

use crate::models::{FeatureWeights, HybridWeights, WeightPreset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub hybrid: HybridWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
    #[serde(default)]
    pub preset: WeightPreset,
    /// Takes precedence over `preset` when present.
    #[serde(default)]
    pub feature_weights: Option<FeatureWeights>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            decision_threshold: default_decision_threshold(),
            preset: WeightPreset::Balanced,
            feature_weights: None,
        }
    }
}

impl DetectionConfig {
    pub fn effective_weights(&self) -> FeatureWeights {
        self.feature_weights
            .unwrap_or_else(|| FeatureWeights::preset(self.preset))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_input_chars: default_max_input_chars(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

fn default_decision_threshold() -> f64 { 0.6 }
fn default_host() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llama3.2".to_string() }
fn default_timeout_secs() -> u64 { 120 }
fn default_max_retries() -> u32 { 3 }
fn default_retry_backoff_ms() -> u64 { 1000 }
fn default_max_input_chars() -> usize { 6000 }
fn default_max_tokens() -> u32 { 512 }

impl AppConfig {
    /// Apply the process environment on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Blank values are skipped and
    /// unparseable numbers are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get("OLLAMA_HOST") {
            self.llm.host = host;
        }
        if let Some(model) = get("DEFAULT_MODEL") {
            self.llm.model = model;
        }
        if let Some(v) = get("OLLAMA_TIMEOUT") {
            if let Some(secs) = parse_override::<u64>("OLLAMA_TIMEOUT", &v) {
                self.llm.timeout_secs = secs;
            }
        }
        if let Some(v) = get("OLLAMA_MAX_RETRIES") {
            if let Some(retries) = parse_override::<u32>("OLLAMA_MAX_RETRIES", &v) {
                self.llm.max_retries = retries;
            }
        }
        if let Some(v) = get("TRADITIONAL_WEIGHT") {
            if let Some(w) = parse_weight_override("TRADITIONAL_WEIGHT", &v) {
                self.hybrid.traditional = w;
            }
        }
        if let Some(v) = get("AI_WEIGHT") {
            if let Some(w) = parse_weight_override("AI_WEIGHT", &v) {
                self.hybrid.ai = w;
            }
        }
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("[CONFIG] Ignoring {}={:?}: not a valid number", key, value);
            None
        }
    }
}

/// Blend weights must be finite and non-negative; anything else is ignored.
fn parse_weight_override(key: &str, value: &str) -> Option<f64> {
    let w = parse_override::<f64>(key, value)?;
    if w.is_finite() && w >= 0.0 {
        Some(w)
    } else {
        warn!("[CONFIG] Ignoring {}={:?}: weight must be finite and non-negative", key, value);
        None
    }
}

pub struct ConfigStore {
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.json"),
        }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("patentAI"))
    }

    /// Store rooted at the default config directory, or `./patentAI` when the
    /// platform has none.
    pub fn open_default() -> Self {
        Self::new(Self::default_config_dir().unwrap_or_else(|| PathBuf::from("patentAI")))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Load configuration from file. A missing file gives the defaults.
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load and then apply environment overrides.
    pub fn load_effective(&self) -> Result<AppConfig, String> {
        let mut config = self.load()?;
        config.apply_env_overrides();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_store() -> (ConfigStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("patentai-config-{}", uuid::Uuid::new_v4()));
        (ConfigStore::new(dir.clone()), dir)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.decision_threshold, 0.6);
        assert_eq!(config.detection.preset, WeightPreset::Balanced);
        assert_eq!(config.llm.host, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.llm.max_input_chars, 6000);
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.hybrid, HybridWeights { traditional: 0.4, ai: 0.6 });
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"llm": {"model": "mistral"}, "detection": {"preset": "aggressive"}}"#).unwrap();
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.retry_backoff_ms, 1000);
        assert_eq!(
            config.detection.effective_weights(),
            FeatureWeights::preset(WeightPreset::Aggressive)
        );
    }

    #[test]
    fn test_explicit_weights_win_over_preset() {
        let mut config = DetectionConfig::default();
        config.feature_weights = Some(FeatureWeights::zero());
        assert_eq!(config.effective_weights(), FeatureWeights::zero());
    }

    #[test]
    fn test_overrides_applied_and_bad_numbers_ignored() {
        let env: HashMap<&str, &str> = [
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("DEFAULT_MODEL", "  qwen2  "),
            ("OLLAMA_TIMEOUT", "30"),
            ("OLLAMA_MAX_RETRIES", "many"),
            ("TRADITIONAL_WEIGHT", "0.5"),
            ("AI_WEIGHT", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.llm.host, "http://gpu-box:11434");
        assert_eq!(config.llm.model, "qwen2");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.hybrid.traditional, 0.5);
        assert_eq!(config.hybrid.ai, 0.6);
    }

    #[test]
    fn test_invalid_blend_weight_overrides_ignored() {
        let env: HashMap<&str, &str> = [("TRADITIONAL_WEIGHT", "-1"), ("AI_WEIGHT", "NaN")]
            .into_iter()
            .collect();

        let mut config = AppConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.hybrid, HybridWeights::default());
        assert!(config.hybrid.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let (store, dir) = temp_store();
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            store.config_file(),
            r#"{"detection": {"decisionThreshold": 0.7}, "hybrid": {"traditional": 0.5, "ai": 0.5}}"#,
        )
        .unwrap();
        let config = store.load().unwrap();
        assert_eq!(config.detection.decision_threshold, 0.7);
        assert_eq!(config.hybrid, HybridWeights { traditional: 0.5, ai: 0.5 });
        assert_eq!(config.llm, LlmConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let (store, _dir) = temp_store();
        assert_eq!(store.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let (store, dir) = temp_store();
        fs::create_dir_all(&dir).unwrap();
        fs::write(store.config_file(), "{not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
        let _ = fs::remove_dir_all(&dir);
    }
}
