//! Gemini API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.
//! Structured calls go to the analysis model with a JSON response schema;
//! free-text calls go to the answer model.

use super::{CompletionOptions, LanguageModel, ResponseSchema};
use crate::config::GeminiConfig;
use crate::error::ResearchError;
use crate::models::{Message, Role};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    analysis_model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            analysis_model: config.analysis_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, request: &GeminiRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ResearchError::LlmUnavailable(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        info!(model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                ResearchError::LlmError(format!("Gemini API error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API error response: {}", error_text);
            return Err(ResearchError::LlmError(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            ResearchError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        Ok(gemini_response.text())
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete_structured(
        &self,
        messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<Option<Value>> {
        let mut request = GeminiRequest::from_messages(messages);
        request.generation_config = Some(GenerationConfig {
            temperature: Some(0.0),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.schema.clone()),
            ..Default::default()
        });

        let text = self.generate(&self.analysis_model, &request).await?;
        let parsed = parse_json_object(&text);
        if parsed.is_none() {
            warn!(schema = schema.name, "Model output did not parse as a JSON object");
        }
        Ok(parsed)
    }

    async fn complete_text(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String> {
        let mut request = GeminiRequest::from_messages(messages);
        request.generation_config = Some(GenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_output_tokens,
            ..Default::default()
        });

        self.generate(&self.model, &request).await
    }
}

/// Accepts bare JSON or JSON wrapped in a markdown fence.
fn parse_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    match serde_json::from_str::<Value>(unfenced) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GeminiRequest {
    /// System messages become the system instruction; the rest keep their order.
    fn from_messages(messages: &[Message]) -> Self {
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        Self {
            contents,
            system_instruction: (!system_text.is_empty()).then(|| SystemInstruction {
                parts: vec![Part { text: system_text }],
            }),
            generation_config: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, empty when there is none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i32,
    #[serde(default)]
    candidates_token_count: i32,
}
