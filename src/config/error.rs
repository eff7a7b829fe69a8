//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host or port")]
    InvalidAddress,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Export file prefix must be a non-empty slug")]
    InvalidFilePrefix,

    #[error("Export margin must be at most 50 mm")]
    InvalidMargin,

    #[error("Export scale must be between 1 and 8")]
    InvalidScale,
}
