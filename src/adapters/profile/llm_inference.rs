//! AI-powered ProfileInference implementation

use async_trait::async_trait;
use std::sync::Arc;

use super::response::{parse_record, INFERENCE_SCHEMA};
use crate::domain::profile::ProfileRecord;
use crate::ports::{
    AIProvider, CompletionRequest, FinishReason, InferenceError, InferenceRequest, Message,
    ProfileInference, RequestMetadata, ResponseSchema,
};

const INFERENCE_PROMPT: &str = "\
Waxaad tahay kaaliye xogta u habeeya qaabka 'Somalipin Profile Template'.
Ka soo saar xogta qofka sawirkan ku jira oo u habeey qaabka JSON ee hoose.
Fadlan ku qor dhamaan xogta luqadda Af-Soomaaliga.

U door hal category oo ku habboon qofka (tusaale: Ganacsiga, Teknoolajiyadda, iwm).";

/// Reads a profile out of a photo with a multimodal model.
pub struct LlmProfileInference {
    ai_provider: Arc<dyn AIProvider>,
    max_tokens: u32,
}

impl LlmProfileInference {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            max_tokens: 2048,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request(&self, request: &InferenceRequest<'_>) -> CompletionRequest {
        let metadata = RequestMetadata::new(format!("infer-{}", uuid::Uuid::new_v4()))
            .with_card(request.card_id);

        CompletionRequest::new(metadata)
            .with_message(Message::user_with_image(request.image, INFERENCE_PROMPT))
            .with_max_tokens(self.max_tokens)
            .with_response_schema(ResponseSchema::new("somalipin_profile", INFERENCE_SCHEMA.clone()))
    }
}

#[async_trait]
impl ProfileInference for LlmProfileInference {
    #[tracing::instrument(
        skip(self, request),
        fields(card_id = %request.card_id, image_fingerprint = %request.image.fingerprint())
    )]
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<ProfileRecord, InferenceError> {
        let completion = self
            .ai_provider
            .complete(self.build_request(&request))
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "inference call failed");
                InferenceError::from(err)
            })?;

        if completion.finish_reason == FinishReason::Length {
            return Err(InferenceError::Truncated);
        }
        if completion.content.trim().is_empty() {
            return Err(InferenceError::EmptyResponse);
        }

        let record = parse_record(&completion.content).map_err(InferenceError::malformed)?;
        let record = record.into_canonical()?;

        tracing::info!(
            category = %record.category,
            achievements = record.achievements.len(),
            "profile inferred"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::{CardId, ValidationError};
    use crate::domain::profile::ImageDatum;
    use crate::ports::{AIError, TokenUsage};

    fn image() -> ImageDatum {
        ImageDatum::from_bytes("image/jpeg", b"\xff\xd8\xff").unwrap()
    }

    const VALID: &str = r#"{"magaca":"Ali Xasan","tagline":"Ganacsade","category":"ganacsiga",
        "sooyaal":"Wuxuu aasaasay shirkad.","guulaha":["Shirkad","Abaal-marin"],
        "xigasho":"Shaqo adag.","socialProof":"Warbixin"}"#;

    async fn infer_with(provider: MockAIProvider) -> Result<ProfileRecord, InferenceError> {
        let inference = LlmProfileInference::new(Arc::new(provider));
        let image = image();
        inference.infer(InferenceRequest::new(&image, CardId::new())).await
    }

    #[tokio::test]
    async fn valid_response_is_normalized() {
        let record = infer_with(MockAIProvider::new().with_response(VALID)).await.unwrap();
        assert_eq!(record.name, "Ali Xasan");
        assert_eq!(record.category, "Ganacsiga (Business)");
        assert_eq!(record.achievements.len(), 2);
    }

    #[tokio::test]
    async fn request_carries_image_prompt_and_schema() {
        let provider = MockAIProvider::new().with_response(VALID);
        let card_id = CardId::new();
        let inference = LlmProfileInference::new(Arc::new(provider.clone()));
        let image = image();
        inference.infer(InferenceRequest::new(&image, card_id)).await.unwrap();

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].image_count(), 1);
        assert!(calls[0].text().contains("Somalipin Profile Template"));
        assert_eq!(calls[0].metadata.card_id, Some(card_id));
        let schema = calls[0].response_schema.as_ref().unwrap();
        assert_eq!(schema.name, "somalipin_profile");
    }

    #[tokio::test]
    async fn missing_category_is_malformed() {
        let response = r#"{"magaca":"A","tagline":"t","sooyaal":"s","guulaha":[],"xigasho":"q","socialProof":"p"}"#;
        let err = infer_with(MockAIProvider::new().with_response(response))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(ref m) if m.contains("category")));
    }

    #[tokio::test]
    async fn unknown_category_is_invalid_record() {
        let response = VALID.replace("ganacsiga", "Astronomy");
        let err = infer_with(MockAIProvider::new().with_response(response))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidRecord(ValidationError::InvalidFormat { .. })
        ));
    }

    #[tokio::test]
    async fn non_json_is_malformed() {
        let err = infer_with(MockAIProvider::new().with_response("Sorry, I cannot."))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_response_is_reported() {
        let err = infer_with(MockAIProvider::new().with_response("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::EmptyResponse));
    }

    #[tokio::test]
    async fn truncated_response_is_reported() {
        let provider = MockAIProvider::new().with_response_full(
            "{\"magaca\":",
            TokenUsage::new(10, 2048),
            FinishReason::Length,
        );
        let err = infer_with(provider).await.unwrap_err();
        assert!(matches!(err, InferenceError::Truncated));
    }

    #[tokio::test]
    async fn provider_error_is_wrapped() {
        let err = infer_with(MockAIProvider::new().with_error(MockError::AuthenticationFailed))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Provider(AIError::AuthenticationFailed)));
    }
}
