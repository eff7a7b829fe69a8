//! Profile Translator Port - Renders a profile record in another language.
//!
//! The translated record has the same seven fields and the same number of
//! achievements, in the same order. Only string content changes.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;
use crate::domain::foundation::CardId;
use crate::domain::profile::{Language, ProfileRecord};

/// Message shown to the user whenever translation fails.
pub const TRANSLATION_USER_MESSAGE: &str = "Waan ka xunnahay, tarjumaadda wey fashilantay.";

/// Port for record translation.
#[async_trait]
pub trait ProfileTranslator: Send + Sync {
    /// Translates a record into `request.target`.
    ///
    /// A target equal to the source language returns the record unchanged.
    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<ProfileRecord, TranslationError>;
}

/// Input to a single translation call.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    /// Always the canonical snapshot, never a derived view.
    pub record: &'a ProfileRecord,
    pub target: Language,
    pub card_id: CardId,
}

impl<'a> TranslationRequest<'a> {
    pub fn new(record: &'a ProfileRecord, target: Language, card_id: CardId) -> Self {
        Self {
            record,
            target,
            card_id,
        }
    }
}

/// Errors from translation.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),

    #[error("AI response was empty")]
    EmptyResponse,

    #[error("translated record is malformed: {0}")]
    MalformedResponse(String),

    #[error("translation changed the number of achievements from {expected} to {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl TranslationError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    /// Text to show the user.
    pub fn user_message(&self) -> &'static str {
        TRANSLATION_USER_MESSAGE
    }
}
