//! Parameter Extractor
//!
//! Turns a question into typed parameters for one intent. Failures become an
//! intent-shaped placeholder carrying an error message.

use crate::clock::Clock;
use crate::llm::LanguageModel;
use crate::models::{IntentParameters, IntentType, Message, QueryResult};
use crate::prompts;
use crate::vocabulary;
use std::sync::Arc;
use tracing::{debug, warn};

pub const MISSING_RESULT_ERROR: &str = "Unable to extract details from the prompt";
pub const CALL_FAILED_ERROR: &str = "Error processing this query type.";

pub struct ParameterExtractor {
    model: Arc<dyn LanguageModel>,
    clock: Arc<dyn Clock>,
}

impl ParameterExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, clock: Arc<dyn Clock>) -> Self {
        Self { model, clock }
    }

    pub async fn extract(&self, intent: IntentType, question: &str) -> QueryResult {
        let prompt = prompts::extraction_prompt(intent, question, self.clock.today());
        let schema = prompts::extraction_schema(intent);

        match self
            .model
            .complete_structured(&[Message::user(prompt)], &schema)
            .await
        {
            Ok(Some(value)) => match IntentParameters::from_value(intent, value) {
                Ok(params) => {
                    let params = normalize(params);
                    debug!(intent = %intent, params = ?params, "Parameters extracted");
                    QueryResult::ok(params)
                }
                Err(e) => {
                    warn!(intent = %intent, "Extraction output did not match schema: {}", e);
                    QueryResult::failed(intent, MISSING_RESULT_ERROR)
                }
            },
            Ok(None) => {
                warn!(intent = %intent, "Extraction returned no parsed result");
                QueryResult::failed(intent, MISSING_RESULT_ERROR)
            }
            Err(e) => {
                warn!(intent = %intent, "Error processing query type: {}", e);
                QueryResult::failed(intent, CALL_FAILED_ERROR)
            }
        }
    }
}

fn clean_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

fn clean_tickers(tickers: Vec<String>) -> Vec<String> {
    tickers.iter().map(|t| clean_ticker(t)).collect()
}

/// Deterministic cleanup applied on top of the model's output: tickers are
/// upper-cased and metric lists are mapped onto the fixed vocabulary.
fn normalize(params: IntentParameters) -> IntentParameters {
    match params {
        IntentParameters::TranscriptSummary(mut p) => {
            p.ticker = clean_ticker(&p.ticker);
            IntentParameters::TranscriptSummary(p)
        }
        IntentParameters::ExecutiveStatements(mut p) => {
            p.tickers = clean_tickers(p.tickers);
            IntentParameters::ExecutiveStatements(p)
        }
        IntentParameters::FinancialDataQuery(mut p) => {
            p.ticker = clean_ticker(&p.ticker);
            p.metrics = vocabulary::normalize_metrics(&p.metrics);
            IntentParameters::FinancialDataQuery(p)
        }
        IntentParameters::MetricAnalysis(mut p) => {
            p.ticker = clean_ticker(&p.ticker);
            // Non-vocabulary terms stay as the discussion topic; they simply
            // pull in no statements.
            if let Some(canonical) = vocabulary::normalize_metric(&p.metric).first() {
                p.metric = canonical.to_string();
            }
            IntentParameters::MetricAnalysis(p)
        }
        IntentParameters::TranscriptComparison(mut p) => {
            p.tickers = clean_tickers(p.tickers);
            IntentParameters::TranscriptComparison(p)
        }
        IntentParameters::MetricComparison(mut p) => {
            p.tickers = clean_tickers(p.tickers);
            p.metrics = vocabulary::normalize_metrics(&p.metrics);
            IntentParameters::MetricComparison(p)
        }
    }
}
