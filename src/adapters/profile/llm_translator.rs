//! AI-powered ProfileTranslator implementation

use async_trait::async_trait;
use std::sync::Arc;

use super::response::{parse_record, TRANSLATION_SCHEMA};
use crate::domain::profile::{Language, ProfileRecord};
use crate::ports::{
    AIProvider, CompletionRequest, FinishReason, Message, ProfileTranslator, RequestMetadata,
    ResponseSchema, TranslationError, TranslationRequest,
};

/// Translates a canonical record with a text model.
pub struct LlmProfileTranslator {
    ai_provider: Arc<dyn AIProvider>,
    max_tokens: u32,
}

impl LlmProfileTranslator {
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

    fn build_prompt(record: &ProfileRecord, target: Language) -> Result<String, TranslationError> {
        let data = serde_json::to_string(record)
            .map_err(|e| TranslationError::malformed(format!("cannot encode record: {}", e)))?;
        Ok(format!(
            "Translate the following Somalipin profile data from Somali into {}.\n\
             Return strictly JSON with the same keys. Keep the number and order of the \
             entries in \"guulaha\".\n\nData: {}",
            target.prompt_name(),
            data
        ))
    }

    fn build_request(&self, request: &TranslationRequest<'_>) -> Result<CompletionRequest, TranslationError> {
        let metadata = RequestMetadata::new(format!("translate-{}", uuid::Uuid::new_v4()))
            .with_card(request.card_id);

        Ok(CompletionRequest::new(metadata)
            .with_message(Message::user(Self::build_prompt(request.record, request.target)?))
            .with_max_tokens(self.max_tokens)
            .with_response_schema(ResponseSchema::new(
                "somalipin_translation",
                TRANSLATION_SCHEMA.clone(),
            )))
    }
}

#[async_trait]
impl ProfileTranslator for LlmProfileTranslator {
    #[tracing::instrument(
        skip(self, request),
        fields(card_id = %request.card_id, language = %request.target)
    )]
    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<ProfileRecord, TranslationError> {
        if request.target.is_source() {
            tracing::debug!("target is the source language, returning record unchanged");
            return Ok(request.record.clone());
        }

        let completion = self
            .ai_provider
            .complete(self.build_request(&request)?)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "translation call failed");
                TranslationError::from(err)
            })?;

        if completion.finish_reason == FinishReason::Length {
            return Err(TranslationError::malformed("response was cut short"));
        }
        if completion.content.trim().is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        let translated = parse_record(&completion.content).map_err(TranslationError::malformed)?;

        let expected = request.record.achievements.len();
        let actual = translated.achievements.len();
        if expected != actual {
            tracing::warn!(expected, actual, "translation changed achievement count");
            return Err(TranslationError::ShapeMismatch { expected, actual });
        }

        Ok(translated)
    }
}
