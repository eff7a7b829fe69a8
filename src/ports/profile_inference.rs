//! Profile Inference Port - Reads a profile record out of a photo.
//!
//! Implementations call an external AI service and return a record that has
//! already passed structural validation; callers never see a partial record.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;
use crate::domain::foundation::{CardId, ValidationError};
use crate::domain::profile::{ImageDatum, ProfileRecord};

/// Message shown to the user whenever inference fails.
pub const INFERENCE_USER_MESSAGE: &str =
    "Cillad ayaa dhacday intii la farsameynayay sawirka. Fadlan isku day markale.";

/// Port for photo-to-record inference.
#[async_trait]
pub trait ProfileInference: Send + Sync {
    /// Infers a canonical profile record from an image.
    ///
    /// # Errors
    ///
    /// Any provider failure, malformed response or schema violation. There is
    /// no retry and no partial result.
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<ProfileRecord, InferenceError>;
}

/// Input to a single inference call.
#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    pub image: &'a ImageDatum,
    /// Card the record will populate, for log correlation.
    pub card_id: CardId,
}

impl<'a> InferenceRequest<'a> {
    pub fn new(image: &'a ImageDatum, card_id: CardId) -> Self {
        Self { image, card_id }
    }
}

/// Errors from profile inference.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),

    #[error("AI response was empty")]
    EmptyResponse,

    #[error("AI response was cut short")]
    Truncated,

    #[error("AI response is not a valid profile: {0}")]
    MalformedResponse(String),

    #[error("AI response violates the profile rules: {0}")]
    InvalidRecord(#[from] ValidationError),
}

impl InferenceError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    /// Text to show the user.
    pub fn user_message(&self) -> &'static str {
        INFERENCE_USER_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_the_same_user_message() {
        let errors = vec![
            InferenceError::Provider(AIError::AuthenticationFailed),
            InferenceError::EmptyResponse,
            InferenceError::Truncated,
            InferenceError::malformed("missing field `category`"),
            InferenceError::InvalidRecord(ValidationError::empty_field("magaca")),
        ];
        for err in errors {
            assert_eq!(err.user_message(), INFERENCE_USER_MESSAGE);
        }
    }

    #[test]
    fn displays_cause() {
        let err = InferenceError::malformed("missing field `category`");
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn profile_inference_is_object_safe() {
        fn _accepts_dyn(_inference: &dyn ProfileInference) {}
    }
}
