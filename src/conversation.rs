//! Conversation entry point
//!
//! ContinuationCheck → Classifying → (ClarificationNeeded | Orchestrating) → Responding
//!
//! Every path ends in a user-visible message. Conversation history is read
//! only; the caller appends the question and answer after the turn.

use crate::classifier::{self, IntentClassifier};
use crate::clock::Clock;
use crate::context::ContinuityChecker;
use crate::extractor::ParameterExtractor;
use crate::fetcher::DataFetcher;
use crate::llm::LanguageModel;
use crate::models::{ChatResponse, Message, QueryOutcome};
use crate::orchestrator::QueryOrchestrator;
use crate::provider::FinancialDataProvider;
use crate::synthesizer::ResponseSynthesizer;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

pub const PROCESSING_APOLOGY: &str = "I apologize, but I encountered an error while processing your question. Please try again or rephrase your question.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ContinuationCheck,
    Classifying,
    ClarificationNeeded,
    Orchestrating,
    Responding,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::ContinuationCheck => "continuation_check",
            PipelineStage::Classifying => "classifying",
            PipelineStage::ClarificationNeeded => "clarification_needed",
            PipelineStage::Orchestrating => "orchestrating",
            PipelineStage::Responding => "responding",
        };
        write!(f, "{}", s)
    }
}

fn enter(stage: PipelineStage) {
    info!(stage = %stage, "Pipeline stage");
}

/// What a turn resolved to before any data is fetched
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPlan {
    Clarify(String),
    Direct(String),
    Queries(QueryOutcome),
}

pub struct ResearchAssistant {
    continuity: ContinuityChecker,
    classifier: IntentClassifier,
    orchestrator: QueryOrchestrator,
    synthesizer: ResponseSynthesizer,
}

impl ResearchAssistant {
    /// One shared model client and provider for every stage
    pub fn new(
        model: Arc<dyn LanguageModel>,
        provider: Arc<dyn FinancialDataProvider>,
        clock: Arc<dyn Clock>,
        history_window: usize,
    ) -> Self {
        let extractor = Arc::new(ParameterExtractor::new(model.clone(), clock.clone()));
        let fetcher = Arc::new(DataFetcher::new(provider, clock));

        Self {
            continuity: ContinuityChecker::new(model.clone()),
            classifier: IntentClassifier::new(model.clone()),
            orchestrator: QueryOrchestrator::new(extractor),
            synthesizer: ResponseSynthesizer::new(model, fetcher, history_window),
        }
    }

    /// Fresh question: full turn, including synthesis
    pub async fn handle_user_query(&self, history: &[Message], question: &str) -> ChatResponse {
        let plan = self.plan_user_query(history, question).await;

        let mut context = history.to_vec();
        context.push(Message::user(question));
        self.respond(plan, &context).await
    }

    /// Reply to a clarifying question: always restarts classification
    pub async fn handle_clarification(
        &self,
        history: &[Message],
        clarification: &str,
    ) -> ChatResponse {
        let plan = self.plan_clarification(history, clarification).await;

        let mut context = history.to_vec();
        context.push(Message::user(clarification));
        self.respond(plan, &context).await
    }

    /// Continuity check (only with history), then classification and extraction
    pub async fn plan_user_query(&self, history: &[Message], question: &str) -> TurnPlan {
        if !history.is_empty() {
            enter(PipelineStage::ContinuationCheck);
            let verdict = self.continuity.analyze(history, question).await;
            if verdict.is_continuation {
                return TurnPlan::Direct(verdict.response);
            }
        }

        self.plan_new_topic(question).await
    }

    /// Rebuilds the original question from the second-to-last message.
    /// With less history than that, the clarification stands alone.
    pub async fn plan_clarification(&self, history: &[Message], clarification: &str) -> TurnPlan {
        let question = match history.len().checked_sub(2).and_then(|i| history.get(i)) {
            Some(original) => enhanced_question(&original.content, clarification),
            None => clarification.to_string(),
        };

        self.plan_new_topic(&question).await
    }

    async fn plan_new_topic(&self, question: &str) -> TurnPlan {
        enter(PipelineStage::Classifying);
        let analysis = self.classifier.classify(question).await;

        if !classifier::passes_gate(&analysis) {
            enter(PipelineStage::ClarificationNeeded);
            return TurnPlan::Clarify(analysis.clarify_question);
        }

        enter(PipelineStage::Orchestrating);
        TurnPlan::Queries(self.orchestrator.process(&analysis, question).await)
    }

    async fn respond(&self, plan: TurnPlan, messages: &[Message]) -> ChatResponse {
        match plan {
            TurnPlan::Clarify(message) => ChatResponse::ClarificationNeeded { message },
            TurnPlan::Direct(message) => {
                enter(PipelineStage::Responding);
                ChatResponse::DirectResponse { message }
            }
            TurnPlan::Queries(outcome) => ChatResponse::Answer {
                message: self.generate_final_response(&outcome, messages).await,
            },
        }
    }

    /// Synthesis for one or many query results. A panic anywhere below
    /// still yields the generic apology.
    pub async fn generate_final_response(
        &self,
        outcome: &QueryOutcome,
        messages: &[Message],
    ) -> String {
        enter(PipelineStage::Responding);

        match AssertUnwindSafe(self.synthesizer.synthesize(outcome, messages))
            .catch_unwind()
            .await
        {
            Ok(answer) => answer,
            Err(_) => {
                error!("Error generating final response");
                PROCESSING_APOLOGY.to_string()
            }
        }
    }
}

pub fn enhanced_question(original: &str, clarification: &str) -> String {
    format!("{} (Additional info: {})", original, clarification)
}
