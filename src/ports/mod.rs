//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## AI Ports
//!
//! - `AIProvider` - Single-shot generative completions with images and JSON schemas
//! - `ProfileInference` - Photo to profile record
//! - `ProfileTranslator` - Profile record to another language
//!
//! ## Export Ports
//!
//! - `CardRenderer` - Builds the card's visual surface
//! - `DocumentRenderer` - Captures a rendered card as a PDF

mod ai_provider;
mod card_export;
mod profile_inference;
mod profile_translator;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, ContentPart, FinishReason,
    Message, ProviderInfo, RequestMetadata, ResponseSchema, TokenUsage,
};
pub use card_export::{
    CardContent, CardRenderer, DocumentOptions, DocumentRenderer, ExportError, ExportFormat,
    ExportedFile, Orientation, PageSize, RenderedCard, EXPORT_USER_MESSAGE,
    RENDERER_MISSING_USER_MESSAGE,
};
pub use profile_inference::{
    InferenceError, InferenceRequest, ProfileInference, INFERENCE_USER_MESSAGE,
};
pub use profile_translator::{
    ProfileTranslator, TranslationError, TranslationRequest, TRANSLATION_USER_MESSAGE,
};
