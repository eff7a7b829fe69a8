//! Card editor errors.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::profile::Language;
use crate::ports::TranslationError;

/// Errors raised by [`CardEditor`](super::CardEditor).
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    /// Translated text is read-only; switch back to the source language to edit.
    #[error("the card is shown in '{language}' and cannot be edited")]
    ReadOnlyView { language: Language },

    #[error("a translation to '{language}' is still in progress")]
    TranslationInFlight { language: Language },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl EditorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EditorError::ReadOnlyView { .. } => ErrorCode::ReadOnlyView,
            EditorError::TranslationInFlight { .. } => ErrorCode::TranslationInFlight,
            EditorError::Validation(_) => ErrorCode::ValidationFailed,
            EditorError::Translation(_) => ErrorCode::TranslationFailed,
        }
    }
}
