//! Response Synthesizer
//!
//! Fetches data for each query result and asks the model for a written
//! answer. Failures never escape: the user gets an apology instead.

use crate::fetcher::DataFetcher;
use crate::llm::{CompletionOptions, LanguageModel};
use crate::models::{Message, QueryOutcome, QueryResult};
use crate::prompts;
use crate::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const EMPTY_RESPONSE: &str = "Sorry, I couldn't generate a response.";
pub const RETRIEVAL_APOLOGY: &str = "I apologize, but I encountered an error while retrieving the financial information. Please try again or rephrase your question.";
pub const NO_INFORMATION: &str = "No information could be found.";

pub struct ResponseSynthesizer {
    model: Arc<dyn LanguageModel>,
    fetcher: Arc<DataFetcher>,
    history_window: usize,
}

impl ResponseSynthesizer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        fetcher: Arc<DataFetcher>,
        history_window: usize,
    ) -> Self {
        Self {
            model,
            fetcher,
            history_window,
        }
    }

    /// One answer per result, produced concurrently and joined in ranking order
    pub async fn synthesize(&self, outcome: &QueryOutcome, messages: &[Message]) -> String {
        match outcome {
            QueryOutcome::Single(result) => self.answer(result, messages).await,
            QueryOutcome::Multiple(results) => {
                let responses =
                    join_all(results.iter().map(|result| self.answer(result, messages))).await;
                combine_responses(responses)
            }
        }
    }

    /// Answer for a single query result
    pub async fn answer(&self, result: &QueryResult, messages: &[Message]) -> String {
        let intent = result.intent_type();

        if let Some(reason) = &result.error {
            warn!(intent = %intent, reason = %reason, "Skipping fetch for failed extraction");
            return RETRIEVAL_APOLOGY.to_string();
        }

        match self.try_answer(result, messages).await {
            Ok(text) if text.trim().is_empty() => EMPTY_RESPONSE.to_string(),
            Ok(text) => {
                info!(intent = %intent, chars = text.len(), "Answer synthesized");
                text
            }
            Err(e) => {
                error!(intent = %intent, "Error processing query with data: {}", e);
                RETRIEVAL_APOLOGY.to_string()
            }
        }
    }

    async fn try_answer(&self, result: &QueryResult, messages: &[Message]) -> Result<String> {
        let data = self.fetcher.fetch(result).await?;
        let data_json = serde_json::to_string_pretty(&data)?;
        let prompt = prompts::synthesis_prompt(&result.params, &data_json);

        let recent = &messages[messages.len().saturating_sub(self.history_window)..];

        let mut conversation = Vec::with_capacity(recent.len() + 2);
        conversation.push(Message::system(prompts::SYNTHESIS_SYSTEM_MESSAGE));
        conversation.extend_from_slice(recent);
        conversation.push(Message::user(prompt));

        self.model
            .complete_text(&conversation, &CompletionOptions::factual())
            .await
    }
}

/// No cross-intent summarization: answers are joined with a blank line.
pub fn combine_responses(responses: Vec<String>) -> String {
    match responses.len() {
        0 => NO_INFORMATION.to_string(),
        1 => responses.into_iter().next().unwrap_or_default(),
        _ => responses.join("\n\n"),
    }
}
