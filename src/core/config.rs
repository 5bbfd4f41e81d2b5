//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::errors::{ClassifierError, Result};
use crate::core::language::{DEFAULT_ENGLISH_RATIO, DEFAULT_REFERENCE_WORDS};

/// Prefix of environment variables read by [`ClassifierConfig::load`]
pub const ENV_PREFIX: &str = "ISSUE_CLASSIFIER";

/// Configuration for the classifier client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub predict_path: String,
    pub correct_path: String,
    pub timeout_ms: u64,
    pub english_ratio: f64,
    pub reference_words: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            predict_path: "/api/predict".to_string(),
            correct_path: "/api/correct".to_string(),
            timeout_ms: 30000,
            english_ratio: DEFAULT_ENGLISH_RATIO,
            reference_words: DEFAULT_REFERENCE_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ClassifierConfig {
    /// Load configuration: defaults, then an optional file, then environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("predict_path", defaults.predict_path)?
            .set_default("correct_path", defaults.correct_path)?
            .set_default("timeout_ms", defaults.timeout_ms as i64)?
            .set_default("english_ratio", defaults.english_ratio)?
            .set_default("reference_words", defaults.reference_words)?;

        if let Some(path) = file {
            if !path.exists() {
                return Err(ClassifierError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("reference_words");

        let mut config: Self = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        // "bug, crash" from the environment leaves padding around each word
        config.reference_words = config
            .reference_words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        config.validate()?;
        Ok(config)
    }

    /// Load from environment only
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(config_error("base_url is required"));
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(config_error(format!("base_url must be an http(s) URL: {}", url)));
        }

        for (name, path) in [("predict_path", &self.predict_path), ("correct_path", &self.correct_path)] {
            if !path.starts_with('/') {
                return Err(config_error(format!("{} must start with '/': {}", name, path)));
            }
        }

        if self.timeout_ms == 0 {
            return Err(config_error("timeout_ms must be greater than 0"));
        }

        if !self.english_ratio.is_finite() || !(0.0..=1.0).contains(&self.english_ratio) {
            return Err(config_error(format!(
                "english_ratio must be between 0 and 1, got {}",
                self.english_ratio
            )));
        }

        if self.reference_words.is_empty() {
            return Err(config_error("reference_words must not be empty"));
        }

        if self.english_ratio == 0.0 {
            warn!("english_ratio is 0, every ASCII text will pass the language gate");
        }

        Ok(())
    }

    /// Full URL of the prediction endpoint
    pub fn predict_url(&self) -> String {
        self.endpoint(&self.predict_path)
    }

    /// Full URL of the correction endpoint
    pub fn correct_url(&self) -> String {
        self.endpoint(&self.correct_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), path)
    }
}

fn config_error(message: impl Into<String>) -> ClassifierError {
    ClassifierError::ConfigError {
        message: message.into(),
    }
}
