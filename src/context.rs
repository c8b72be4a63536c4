//! Context Continuity Checker
//!
//! Decides whether a follow-up can be answered from what the conversation
//! already surfaced. Conservative: any doubt or failure means "new topic".

use crate::llm::LanguageModel;
use crate::models::{ContextAnalysisResult, Message};
use crate::prompts;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ContinuityChecker {
    model: Arc<dyn LanguageModel>,
}

impl ContinuityChecker {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, history: &[Message], question: &str) -> ContextAnalysisResult {
        let messages = [Message::user(prompts::continuity_prompt(history, question))];
        let schema = prompts::continuity_schema();

        let verdict = match self.model.complete_structured(&messages, &schema).await {
            Ok(Some(value)) => match serde_json::from_value::<ContextAnalysisResult>(value) {
                Ok(result) => sanitize(result),
                Err(e) => {
                    warn!("Continuity output did not match schema: {}", e);
                    ContextAnalysisResult::new_topic()
                }
            },
            Ok(None) => ContextAnalysisResult::new_topic(),
            Err(e) => {
                warn!("Error analyzing context: {}", e);
                ContextAnalysisResult::new_topic()
            }
        };

        info!(is_continuation = verdict.is_continuation, "Context analyzed");
        verdict
    }
}

/// A continuation must carry a usable answer; a new topic carries none.
fn sanitize(result: ContextAnalysisResult) -> ContextAnalysisResult {
    let response = result.response.trim();
    if result.is_continuation && !response.is_empty() {
        ContextAnalysisResult {
            is_continuation: true,
            response: response.to_string(),
        }
    } else {
        if result.is_continuation {
            warn!("Continuation verdict without an answer; treating as new topic");
        }
        ContextAnalysisResult::new_topic()
    }
}
