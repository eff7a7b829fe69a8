//! Errors surfaced by the application services.

use thiserror::Error;

use crate::domain::card::EditorError;
use crate::domain::flow::AppStatus;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::ports::{ExportError, InferenceError};

/// Any failure of a card operation.
#[derive(Debug, Clone, Error)]
pub enum CardError {
    #[error("no image has been uploaded")]
    NoImage,

    #[error("no profile has been generated yet")]
    NoProfile,

    #[error("an image is already being processed")]
    AlreadyProcessing,

    #[error("cannot {action} while the card is {status}")]
    InvalidState {
        status: AppStatus,
        action: &'static str,
    },

    #[error("invalid image: {0}")]
    InvalidImage(ValidationError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl CardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CardError::NoImage => ErrorCode::NoImage,
            CardError::NoProfile => ErrorCode::NoProfile,
            CardError::AlreadyProcessing => ErrorCode::AlreadyProcessing,
            CardError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            CardError::InvalidImage(_) => ErrorCode::InvalidImage,
            CardError::Editor(err) => err.code(),
            CardError::Inference(_) => ErrorCode::InferenceFailed,
            CardError::Export(ExportError::AlreadyInProgress) => ErrorCode::ExportInProgress,
            CardError::Export(ExportError::UnsupportedFormat(_)) => ErrorCode::ValidationFailed,
            CardError::Export(_) => ErrorCode::ExportFailed,
        }
    }

    /// Message for the person using the app. External failures use the
    /// app's own wording; everything else explains the rule that was broken.
    pub fn user_message(&self) -> String {
        match self {
            CardError::Inference(err) => err.user_message().to_string(),
            CardError::Editor(EditorError::Translation(err)) => err.user_message().to_string(),
            CardError::Export(ExportError::UnsupportedFormat(_)) => self.to_string(),
            CardError::Export(err) => err.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Carries the user-facing message, plus the offending field for input errors.
impl From<CardError> for DomainError {
    fn from(err: CardError) -> Self {
        let domain = DomainError::new(err.code(), err.user_message());
        match &err {
            CardError::InvalidImage(inner) | CardError::Editor(EditorError::Validation(inner)) => {
                domain.with_detail("field", inner.field())
            }
            _ => domain,
        }
    }
}
