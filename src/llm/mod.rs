//! Language model trait and implementations
//!
//! Every model call in the pipeline goes through [`LanguageModel`]: either a
//! completion constrained to a response schema, or free-form text.

use crate::models::Message;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod gemini;
pub mod scripted;

pub use gemini::GeminiClient;
pub use scripted::{ScriptedModel, ScriptedReply};

/// Named JSON schema the model output must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
}

impl ResponseSchema {
    pub fn new(name: &'static str, schema: Value) -> Self {
        Self { name, schema }
    }
}

/// Knobs for free-text generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Low temperature, favouring factual consistency over variety
    pub fn factual() -> Self {
        Self {
            temperature: Some(0.3),
            max_output_tokens: None,
        }
    }
}

/// Shared, stateless-per-call model client
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completion constrained to `schema`.
    ///
    /// `Ok(None)` means the call succeeded but produced no parseable object.
    async fn complete_structured(
        &self,
        messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<Option<Value>>;

    /// Free-form completion
    async fn complete_text(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String>;
}
