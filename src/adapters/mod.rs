//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generative model providers (Gemini, OpenAI, mock)
//! - `profile` - Profile inference and translation on top of an AI provider
//! - `export` - HTML card rendering and PDF capture
//! - `http` - REST API (axum)

pub mod ai;
pub mod export;
pub mod http;
pub mod profile;
