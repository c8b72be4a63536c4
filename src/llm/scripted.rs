//! Scripted language model
//!
//! Keeps the pipeline functional without a live model: structured replies are
//! keyed by schema name, text replies by a substring of the final prompt.

use super::{CompletionOptions, LanguageModel, ResponseSchema};
use crate::error::ResearchError;
use crate::models::Message;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Structured(Value),
    /// Call succeeds but yields no parsed object
    Missing,
    Text(String),
    Fail(String),
}

/// A recorded model invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Schema name, or `None` for free-text calls
    pub schema: Option<&'static str>,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
}

impl RecordedCall {
    /// Content of the final message, which carries the composed prompt
    pub fn prompt(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or_default()
    }
}

#[derive(Default)]
pub struct ScriptedModel {
    structured: HashMap<&'static str, ScriptedReply>,
    text_rules: Vec<(Option<String>, ScriptedReply)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_structured(mut self, schema: &'static str, value: Value) -> Self {
        self.structured.insert(schema, ScriptedReply::Structured(value));
        self
    }

    pub fn with_missing(mut self, schema: &'static str) -> Self {
        self.structured.insert(schema, ScriptedReply::Missing);
        self
    }

    pub fn with_failure(mut self, schema: &'static str, message: &str) -> Self {
        self.structured
            .insert(schema, ScriptedReply::Fail(message.to_string()));
        self
    }

    /// Reply with `text` whenever the final prompt contains `needle`
    pub fn with_text_when(mut self, needle: &str, text: &str) -> Self {
        self.text_rules.push((
            Some(needle.to_string()),
            ScriptedReply::Text(text.to_string()),
        ));
        self
    }

    /// Reply used when no `with_text_when` rule matches
    pub fn with_text(mut self, text: &str) -> Self {
        self.text_rules
            .push((None, ScriptedReply::Text(text.to_string())));
        self
    }

    pub fn with_text_failure(mut self, message: &str) -> Self {
        self.text_rules
            .push((None, ScriptedReply::Fail(message.to_string())));
        self
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: RecordedCall) {
        self.lock_calls().push(call);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    pub fn structured_calls(&self, schema: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|c| c.schema == Some(schema))
            .count()
    }

    pub fn text_calls(&self) -> usize {
        self.lock_calls().iter().filter(|c| c.schema.is_none()).count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete_structured(
        &self,
        messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<Option<Value>> {
        self.record(RecordedCall {
            schema: Some(schema.name),
            messages: messages.to_vec(),
            temperature: None,
        });

        match self.structured.get(schema.name) {
            Some(ScriptedReply::Structured(value)) => Ok(Some(value.clone())),
            Some(ScriptedReply::Missing) => Ok(None),
            Some(ScriptedReply::Text(text)) => Ok(serde_json::from_str(text).ok()),
            Some(ScriptedReply::Fail(message)) => Err(ResearchError::LlmError(message.clone())),
            None => Err(ResearchError::LlmError(format!(
                "no scripted reply for schema {}",
                schema.name
            ))),
        }
    }

    async fn complete_text(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String> {
        let call = RecordedCall {
            schema: None,
            messages: messages.to_vec(),
            temperature: options.temperature,
        };
        let prompt = call.prompt().to_string();
        self.record(call);

        let reply = self
            .text_rules
            .iter()
            .find(|(needle, _)| {
                needle
                    .as_deref()
                    .map(|n| prompt.contains(n))
                    .unwrap_or(false)
            })
            .or_else(|| self.text_rules.iter().find(|(needle, _)| needle.is_none()))
            .map(|(_, reply)| reply);

        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text.clone()),
            Some(ScriptedReply::Fail(message)) => Err(ResearchError::LlmError(message.clone())),
            Some(ScriptedReply::Structured(value)) => Ok(value.to_string()),
            Some(ScriptedReply::Missing) | None => Err(ResearchError::LlmError(
                "no scripted text reply".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_structured_replies_by_schema() {
        let model = ScriptedModel::new()
            .with_structured("alpha", json!({ "a": 1 }))
            .with_missing("beta");

        let alpha = ResponseSchema::new("alpha", json!({}));
        let beta = ResponseSchema::new("beta", json!({}));
        let gamma = ResponseSchema::new("gamma", json!({}));
        let messages = vec![Message::user("hi")];

        assert_eq!(
            model.complete_structured(&messages, &alpha).await.unwrap(),
            Some(json!({ "a": 1 }))
        );
        assert_eq!(model.complete_structured(&messages, &beta).await.unwrap(), None);
        assert!(model.complete_structured(&messages, &gamma).await.is_err());
        assert_eq!(model.structured_calls("alpha"), 1);
        assert_eq!(model.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_text_rules_match_prompt() {
        let model = ScriptedModel::new()
            .with_text_when("revenue", "Revenue was $10B.")
            .with_text("Fallback.");
        let options = CompletionOptions::factual();

        let matched = model
            .complete_text(&[Message::user("what was revenue")], &options)
            .await
            .unwrap();
        let fallback = model
            .complete_text(&[Message::user("anything else")], &options)
            .await
            .unwrap();

        assert_eq!(matched, "Revenue was $10B.");
        assert_eq!(fallback, "Fallback.");
        assert_eq!(model.calls()[0].temperature, Some(0.3));
    }

    #[test]
    fn test_text_failure_without_rules() {
        let empty = ScriptedModel::new();
        let failing = ScriptedModel::new().with_text_failure("overloaded");
        let options = CompletionOptions::default();
        let messages = [Message::user("hello")];

        assert!(tokio_test::block_on(empty.complete_text(&messages, &options)).is_err());
        assert!(matches!(
            tokio_test::block_on(failing.complete_text(&messages, &options)),
            Err(ResearchError::LlmError(m)) if m == "overloaded"
        ));
        assert_eq!(failing.text_calls(), 1);
    }
}
