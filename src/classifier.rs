//! Intent Classifier
//!
//! Classifies a question into one or more ranked intents with a confidence
//! score for the primary one. Never fails: every error degrades to a
//! zero-confidence clarification request.

use crate::llm::LanguageModel;
use crate::models::{IntentType, Message, QueryAnalysisResult};
use crate::prompts;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Minimum primary-intent confidence for the pipeline to proceed without clarification
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Loosely-typed view of the model output; unknown intent tags are dropped
/// instead of failing the whole classification.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawAnalysis {
    query_types: Vec<String>,
    confidence_score: Option<f64>,
    clarify_question: Option<String>,
}

pub struct IntentClassifier {
    model: Arc<dyn LanguageModel>,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn classify(&self, question: &str) -> QueryAnalysisResult {
        let messages = [Message::user(prompts::classification_prompt(question))];
        let schema = prompts::classification_schema();

        let analysis = match self.model.complete_structured(&messages, &schema).await {
            Ok(Some(value)) => interpret(value),
            Ok(None) => {
                warn!("Classifier returned no parsed result");
                fallback()
            }
            Err(e) => {
                warn!("Error analyzing query: {}", e);
                fallback()
            }
        };

        info!(
            intents = ?analysis.query_types,
            confidence = analysis.confidence_score,
            "Query classified"
        );
        analysis
    }
}

/// True when the primary intent is confident enough to skip clarification
pub fn passes_gate(analysis: &QueryAnalysisResult) -> bool {
    analysis.confidence_score >= CONFIDENCE_THRESHOLD
}

fn fallback() -> QueryAnalysisResult {
    QueryAnalysisResult {
        query_types: Vec::new(),
        confidence_score: 0.0,
        clarify_question: prompts::FALLBACK_CLARIFY_QUESTION.to_string(),
    }
}

fn interpret(value: Value) -> QueryAnalysisResult {
    let raw: RawAnalysis = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Classifier output did not match schema: {}", e);
            return fallback();
        }
    };

    let mut query_types: Vec<IntentType> = Vec::with_capacity(raw.query_types.len());
    for tag in &raw.query_types {
        match serde_json::from_value::<IntentType>(Value::String(tag.clone())) {
            Ok(intent) if !query_types.contains(&intent) => query_types.push(intent),
            Ok(_) => debug!(tag = %tag, "Duplicate intent tag dropped"),
            Err(_) => warn!(tag = %tag, "Unknown intent tag dropped"),
        }
    }

    let confidence_score = raw
        .confidence_score
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let mut clarify_question = raw.clarify_question.unwrap_or_default().trim().to_string();
    if confidence_score < CONFIDENCE_THRESHOLD && clarify_question.is_empty() {
        clarify_question = prompts::FALLBACK_CLARIFY_QUESTION.to_string();
    }

    QueryAnalysisResult {
        query_types,
        confidence_score,
        clarify_question,
    }
}
