//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Bearer token for the completion endpoint
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Chat-completions URL
    pub endpoint: String,

    /// Maximum time for a single extraction call (seconds)
    pub timeout_secs: u64,

    /// Characters of raw payload kept in validation-failure log entries
    pub excerpt_len: usize,
}

impl ExtractorConfig {
    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Get the extraction timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key missing in settings".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: wayfare_llm::openai::DEFAULT_MODEL.to_string(),
            endpoint: wayfare_llm::openai::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: wayfare_llm::openai::DEFAULT_TIMEOUT_SECS,
            excerpt_len: 500,
        }
    }
}

impl fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("excerpt_len", &self.excerpt_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_needs_api_key() {
        let config = ExtractorConfig::default();
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_err());
        assert!(config.with_api_key("sk-test").validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ExtractorConfig::default().with_api_key("sk");
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("api_key = \"sk-abc\"\ntimeout_secs = 10\n").unwrap();
        assert_eq!(config.api_key, "sk-abc");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.excerpt_len, 500);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default().with_api_key("sk");
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.endpoint, config.endpoint);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ExtractorConfig::default().with_api_key("sk-secret");
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
