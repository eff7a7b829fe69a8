//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider used for inference and translation
    #[serde(default)]
    pub provider: AiProvider,

    /// Google Gemini API key
    pub gemini_api_key: Option<Secret<String>>,

    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// Model override; each provider has its own default
    pub model: Option<String>,

    /// API base URL override
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAI,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key of the selected provider, if set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider {
            AiProvider::Gemini => self.gemini_api_key.as_ref(),
            AiProvider::OpenAI => self.openai_api_key.as_ref(),
        };
        key.map(|k| k.expose_secret().as_str())
            .filter(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key().is_none() {
            return Err(match self.provider {
                AiProvider::Gemini => ValidationError::MissingRequired("GEMINI_API_KEY"),
                AiProvider::OpenAI => ValidationError::MissingRequired("OPENAI_API_KEY"),
            });
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidBaseUrl);
            }
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            gemini_api_key: None,
            openai_api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProvider::Gemini);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.model.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 20,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_api_key_follows_provider() {
        let config = AiConfig {
            gemini_api_key: Some(Secret::new("gem-key".to_string())),
            openai_api_key: Some(Secret::new("sk-key".to_string())),
            ..Default::default()
        };
        assert_eq!(config.api_key(), Some("gem-key"));

        let config = AiConfig {
            provider: AiProvider::OpenAI,
            ..config
        };
        assert_eq!(config.api_key(), Some("sk-key"));
    }

    #[test]
    fn test_validation_missing_key() {
        let config = AiConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("GEMINI_API_KEY"))
        ));

        let config = AiConfig {
            provider: AiProvider::OpenAI,
            gemini_api_key: Some(Secret::new("gem-key".to_string())),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn test_validation_blank_key() {
        let config = AiConfig {
            gemini_api_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_base_url() {
        let config = AiConfig {
            gemini_api_key: Some(Secret::new("gem-key".to_string())),
            base_url: Some("localhost:9000".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBaseUrl)));
    }

    #[test]
    fn test_validation_valid_config() {
        let config = AiConfig {
            gemini_api_key: Some(Secret::new("gem-key".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
