//! Query Orchestrator
//!
//! Extracts parameters for every classified intent concurrently and keeps
//! the classifier's ranking in the output.

use crate::extractor::ParameterExtractor;
use crate::models::{IntentType, QueryAnalysisResult, QueryOutcome, QueryResult};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

pub const UNDETERMINED_QUERY_ERROR: &str = "Could not determine query type";

pub struct QueryOrchestrator {
    extractor: Arc<ParameterExtractor>,
}

impl QueryOrchestrator {
    pub fn new(extractor: Arc<ParameterExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn process(&self, analysis: &QueryAnalysisResult, question: &str) -> QueryOutcome {
        if analysis.query_types.is_empty() {
            warn!("No intents classified; returning default error result");
            return QueryOutcome::Single(QueryResult::failed(
                IntentType::ExecutiveStatements,
                UNDETERMINED_QUERY_ERROR,
            ));
        }

        // Each extraction contains its own failure, so one intent never
        // aborts its siblings. join_all preserves input order.
        let results = join_all(
            analysis
                .query_types
                .iter()
                .map(|intent| self.extractor.extract(*intent, question)),
        )
        .await;

        let failed = results.iter().filter(|r| r.is_error()).count();
        info!(
            intents = results.len(),
            failed,
            "Parameter extraction complete"
        );

        QueryOutcome::from_results(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::extractor::CALL_FAILED_ERROR;
    use crate::llm::ScriptedModel;
    use crate::models::IntentParameters;
    use serde_json::json;

    fn orchestrator(model: ScriptedModel) -> QueryOrchestrator {
        let extractor = ParameterExtractor::new(
            Arc::new(model),
            Arc::new(FixedClock::ymd(2024, 5, 17)),
        );
        QueryOrchestrator::new(Arc::new(extractor))
    }

    fn analysis(types: Vec<IntentType>) -> QueryAnalysisResult {
        QueryAnalysisResult {
            query_types: types,
            confidence_score: 0.9,
            clarify_question: String::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_classification_yields_default_error() {
        let outcome = orchestrator(ScriptedModel::new())
            .process(&analysis(vec![]), "???")
            .await;

        match outcome {
            QueryOutcome::Single(result) => {
                assert_eq!(result.intent_type(), IntentType::ExecutiveStatements);
                assert_eq!(result.error.as_deref(), Some(UNDETERMINED_QUERY_ERROR));
            }
            other => panic!("expected single result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_order_and_isolation() {
        let model = ScriptedModel::new()
            .with_structured(
                "financial_data_query",
                json!({ "company": "Amazon", "ticker": "AMZN", "metrics": ["revenue"], "timeFrame": "latest_quarter" }),
            )
            .with_failure("executive_statements", "rate limited")
            .with_structured(
                "transcript_summary",
                json!({ "company": "Amazon", "ticker": "AMZN", "timeFrame": "latest_quarter" }),
            );

        let outcome = orchestrator(model)
            .process(
                &analysis(vec![
                    IntentType::FinancialDataQuery,
                    IntentType::ExecutiveStatements,
                    IntentType::TranscriptSummary,
                ]),
                "Amazon revenue, Jassy on AWS, and a call summary",
            )
            .await;

        let results = outcome.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].intent_type(), IntentType::FinancialDataQuery);
        assert_eq!(results[1].intent_type(), IntentType::ExecutiveStatements);
        assert_eq!(results[2].intent_type(), IntentType::TranscriptSummary);

        assert!(results[0].error.is_none());
        assert_eq!(results[1].error.as_deref(), Some(CALL_FAILED_ERROR));
        assert_eq!(
            results[1].params,
            IntentParameters::empty(IntentType::ExecutiveStatements)
        );
        assert!(results[2].error.is_none());
    }

    #[tokio::test]
    async fn test_single_intent_is_unwrapped() {
        let model = ScriptedModel::new().with_structured(
            "transcript_summary",
            json!({ "company": "Tesla", "ticker": "TSLA", "timeFrame": "latest_quarter" }),
        );
        let outcome = orchestrator(model)
            .process(&analysis(vec![IntentType::TranscriptSummary]), "Summarize Tesla's call")
            .await;
        assert!(matches!(outcome, QueryOutcome::Single(_)));
    }
}
