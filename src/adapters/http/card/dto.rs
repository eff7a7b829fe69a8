//! Data transfer objects for card endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;
use crate::domain::profile::{Category, Language, ProfileEdit};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/card/image` and `PUT /api/card/image`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRequest {
    /// Base64 `data:image/...` URI.
    pub image: String,
}

/// Body of `PATCH /api/card/fields`.
#[derive(Debug, Clone, Deserialize)]
pub struct EditRequest {
    pub edit: ProfileEdit,
}

/// Body of `POST /api/card/language`.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRequest {
    pub language: Language,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Entry of the language selector.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub rtl: bool,
    pub source: bool,
}

impl From<Language> for LanguageOption {
    fn from(language: Language) -> Self {
        Self {
            code: language.code(),
            name: language.display_name(),
            icon: language.icon(),
            rtl: language.is_rtl(),
            source: language.is_source(),
        }
    }
}

/// Entry of the category selector.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryOption {
    /// Label stored in the record, e.g. `Ganacsiga (Business)`.
    pub label: String,
    pub somali: &'static str,
    pub english: &'static str,
}

impl From<Category> for CategoryOption {
    fn from(category: Category) -> Self {
        Self {
            label: category.label(),
            somali: category.somali(),
            english: category.english(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        let response = ErrorResponse::new(err.code.to_string(), err.message);
        if err.details.is_empty() {
            response
        } else {
            response.with_details(serde_json::json!(err.details))
        }
    }
}
