//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PROFILE_CARD` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use profile_card::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod ai;
mod error;
mod export;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use export::ExportConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (Gemini/OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Card export configuration (filenames, page setup, PDF engine)
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PROFILE_CARD` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PROFILE_CARD__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PROFILE_CARD__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    /// - `PROFILE_CARD__EXPORT__MARGIN_MM=10` -> `export.margin_mm = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PROFILE_CARD")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.export.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Orientation, PageSize};
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("PROFILE_CARD__AI__GEMINI_API_KEY", "gem-test-key");
    }

    fn clear_env() {
        for key in [
            "PROFILE_CARD__AI__GEMINI_API_KEY",
            "PROFILE_CARD__AI__PROVIDER",
            "PROFILE_CARD__SERVER__PORT",
            "PROFILE_CARD__SERVER__ENVIRONMENT",
            "PROFILE_CARD__EXPORT__PAGE_SIZE",
            "PROFILE_CARD__EXPORT__ORIENTATION",
            "PROFILE_CARD__EXPORT__MARGIN_MM",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Gemini);
        assert_eq!(config.ai.api_key(), Some("gem-test-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.export.file_prefix, "somalipin");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PROFILE_CARD__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PROFILE_CARD__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }

    #[test]
    fn test_export_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PROFILE_CARD__EXPORT__PAGE_SIZE", "Letter");
        env::set_var("PROFILE_CARD__EXPORT__ORIENTATION", "landscape");
        env::set_var("PROFILE_CARD__EXPORT__MARGIN_MM", "10");
        let result = AppConfig::load();
        clear_env();

        let options = result.unwrap().export.document_options();
        assert_eq!(options.page_size, PageSize::Letter);
        assert_eq!(options.orientation, Orientation::Landscape);
        assert_eq!(options.margin_mm, 10);
    }
}
