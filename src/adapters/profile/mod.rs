//! Profile adapters - AI-backed inference and translation of profile records.

mod llm_inference;
mod llm_translator;
mod response;

pub use llm_inference::LlmProfileInference;
pub use llm_translator::LlmProfileTranslator;
pub use response::{strip_code_fence, INFERENCE_SCHEMA, TRANSLATION_SCHEMA};
