//! AI Provider Port - Interface for generative-AI provider integrations.
//!
//! This port abstracts all interactions with generative-AI services (Gemini,
//! OpenAI, ...), so inference and translation can ask for structured output
//! without coupling to a specific provider.
//!
//! # Design
//!
//! - Single-shot completions; callers never stream
//! - Provider-agnostic messages made of text and inline image parts
//! - Optional JSON schema the provider must constrain its output to
//! - Error types for common failure modes (rate limits, filtering, etc.)
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AIProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
//!         Ok(CompletionResponse {
//!             content: "{}".to_string(),
//!             usage: TokenUsage::default(),
//!             model: "echo".to_string(),
//!             finish_reason: FinishReason::Stop,
//!         })
//!     }
//!
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::CardId;
use crate::domain::profile::ImageDatum;

/// Port for generative-AI provider interactions.
///
/// Implementations connect to external AI services and translate between the
/// provider-specific API and these types. Implementations do not retry.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Get provider information (name, model, capabilities).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for AI completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// JSON schema the response must follow. Implies a JSON response.
    pub response_schema: Option<ResponseSchema>,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    /// Creates a new completion request with required metadata.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            max_tokens: None,
            response_schema: None,
            metadata,
        }
    }

    /// Adds a message.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Constrains the response to a JSON schema.
    pub fn with_response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Concatenated text of every message, for diagnostics and tests.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .flat_map(|m| m.parts.iter())
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of inline images across all messages.
    pub fn image_count(&self) -> usize {
        self.messages
            .iter()
            .flat_map(|m| m.parts.iter())
            .filter(|p| matches!(p, ContentPart::InlineImage { .. }))
            .count()
    }
}

/// A user turn in the request. Requests are single-shot, so every message
/// comes from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Ordered content parts.
    pub parts: Vec<ContentPart>,
}

impl Message {
    /// Creates a text-only message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    /// Creates a message carrying an image followed by instructions.
    pub fn user_with_image(image: &ImageDatum, content: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::image(image), ContentPart::Text(content.into())],
        }
    }
}

/// One part of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    Text(String),
    InlineImage {
        mime_type: String,
        /// Base64 payload without the data URI header.
        data: String,
    },
}

impl ContentPart {
    /// Inline image part for an uploaded photo.
    pub fn image(image: &ImageDatum) -> Self {
        ContentPart::InlineImage {
            mime_type: image.mime_type().to_string(),
            data: image.base64_payload().to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            ContentPart::InlineImage { .. } => None,
        }
    }
}

/// JSON schema a response must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Short identifier some providers require.
    pub name: String,
    /// Standard JSON Schema (lower-case type names).
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Card the request is made for, once one exists.
    pub card_id: Option<CardId>,
    /// Trace ID for log correlation.
    pub trace_id: String,
}

impl RequestMetadata {
    /// Creates new request metadata.
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            card_id: None,
            trace_id: trace_id.into(),
        }
    }

    /// Associates the request with a card.
    pub fn with_card(mut self, card_id: CardId) -> Self {
        self.card_id = Some(card_id);
        self
    }
}

/// Response from AI completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    /// Token usage.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates new token usage.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// An error occurred.
    Error,
}

/// Provider information and capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini", "openai").
    pub name: String,
    /// Model identifier.
    pub model: String,
    /// Whether inline images are accepted.
    pub supports_images: bool,
    /// Whether output can be constrained to a JSON schema.
    pub supports_json_schema: bool,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            supports_images: true,
            supports_json_schema: true,
        }
    }

    /// Sets image support.
    pub fn with_images(mut self, supports: bool) -> Self {
        self.supports_images = supports;
        self
    }

    /// Sets JSON schema support.
    pub fn with_json_schema(mut self, supports: bool) -> Self {
        self.supports_json_schema = supports;
        self
    }
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Maps a transport error from the HTTP client.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u32) -> Self {
        if err.is_timeout() {
            AIError::Timeout { timeout_secs }
        } else if err.is_connect() {
            AIError::network(format!("Connection failed: {}", err))
        } else {
            AIError::network(err.to_string())
        }
    }

    /// Maps an unsuccessful HTTP status and its body.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(parse_retry_after(body)),
            400 | 404 | 422 => AIError::InvalidRequest(body.to_string()),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, body)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, body)),
        }
    }

    /// Returns true if a later attempt might succeed. Nothing in this crate
    /// retries; failures are logged with this flag.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}

/// Parses "try again in Ns" out of a provider error body; defaults to 30s.
fn parse_retry_after(error_body: &str) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(msg) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = msg.find("try again in ") {
                let rest = &msg[idx + "try again in ".len()..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
    }
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_metadata() -> RequestMetadata {
        RequestMetadata::new("trace-123")
    }

    #[test]
    fn completion_request_builder_works() {
        let image = ImageDatum::from_bytes("image/jpeg", b"jpeg").unwrap();
        let request = CompletionRequest::new(test_metadata().with_card(CardId::new()))
            .with_message(Message::user_with_image(&image, "Describe"))
            .with_max_tokens(100)
            .with_response_schema(ResponseSchema::new("profile", serde_json::json!({})));

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].parts.len(), 2);
        assert_eq!(request.text(), "Describe");
        assert_eq!(request.image_count(), 1);
        assert_eq!(request.max_tokens, Some(100));
        assert!(request.response_schema.is_some());
        assert!(request.metadata.card_id.is_some());
    }

    #[test]
    fn image_part_strips_data_uri_header() {
        let image = ImageDatum::from_bytes("image/png", b"png").unwrap();
        match ContentPart::image(&image) {
            ContentPart::InlineImage { mime_type, data } => {
                assert_eq!(mime_type, "image/png");
                assert!(!data.starts_with("data:"));
                assert_eq!(data, image.base64_payload());
            }
            other => panic!("expected image part, got {:?}", other),
        }
    }

    #[test]
    fn token_usage_calculates_total() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn provider_info_builder_works() {
        let info = ProviderInfo::new("gemini", "gemini-3-flash-preview")
            .with_images(true)
            .with_json_schema(false);

        assert_eq!(info.name, "gemini");
        assert!(info.supports_images);
        assert!(!info.supports_json_schema);
    }

    #[test]
    fn ai_error_retryable_classification() {
        assert!(AIError::rate_limited(30).is_retryable());
        assert!(AIError::unavailable("down").is_retryable());
        assert!(AIError::network("reset").is_retryable());
        assert!(AIError::Timeout { timeout_secs: 30 }.is_retryable());

        assert!(!AIError::AuthenticationFailed.is_retryable());
        assert!(!AIError::content_filtered("bad").is_retryable());
        assert!(!AIError::parse("junk").is_retryable());
    }

    #[test]
    fn status_codes_map_to_errors() {
        assert!(matches!(AIError::from_status(401, ""), AIError::AuthenticationFailed));
        assert!(matches!(AIError::from_status(403, ""), AIError::AuthenticationFailed));
        assert!(matches!(AIError::from_status(400, "bad"), AIError::InvalidRequest(_)));
        assert!(matches!(AIError::from_status(503, ""), AIError::Unavailable { .. }));
        assert!(matches!(
            AIError::from_status(429, ""),
            AIError::RateLimited { retry_after_secs: 30 }
        ));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 12 seconds."}}"#;
        assert_eq!(parse_retry_after(error), 12);
        assert_eq!(parse_retry_after("not json"), 30);
    }

    #[test]
    fn ai_error_displays_correctly() {
        assert_eq!(
            AIError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            AIError::Timeout { timeout_secs: 60 }.to_string(),
            "request timed out after 60s"
        );
    }
}
