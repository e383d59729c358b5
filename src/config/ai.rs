//! Reasoning provider configuration.

use secrecy::Secret;
use serde::Deserialize;

use super::error::ConfigError;

/// Settings for the chat-completion provider.
///
/// With no API key configured the application runs against the mock
/// provider and every selection comes from the heuristic fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider API key. Absent means offline mode.
    #[serde(default)]
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.4
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("ai.model must not be empty".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "ai.timeout_seconds must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(
                "ai.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = AiConfig {
            timeout_seconds: 0,
            ..AiConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let cfg = AiConfig {
            temperature: 3.5,
            ..AiConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
