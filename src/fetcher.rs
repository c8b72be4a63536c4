//! Data Fetcher
//!
//! Maps one query result onto provider calls: which statements, which time
//! window, which tickers. Fan-out is concurrent; results are recombined in
//! request order. Any failed call fails the whole fetch.

use crate::clock::Clock;
use crate::error::ResearchError;
use crate::models::{IntentParameters, QueryResult, SpecificPeriod, TimeFrame};
use crate::provider::{Endpoint, FinancialDataProvider, ProviderQuery};
use crate::vocabulary::{self, StatementCategory};
use crate::Result;
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

//
// ================= Time Windows =================
//

/// How a time frame was turned into query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowResolution {
    /// Time frame and its period fields were all usable
    Resolved,
    /// No time frame was given; latest quarter is assumed
    Default,
    /// The time frame needed period fields that were missing or invalid
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub query: ProviderQuery,
    pub resolution: WindowResolution,
}

fn positive<T: Copy + PartialOrd + Default>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v > T::default())
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

pub fn resolve_window(
    frame: TimeFrame,
    period: Option<&SpecificPeriod>,
    clock: &dyn Clock,
) -> TimeWindow {
    let quarter = positive(period.and_then(|p| p.quarter)).filter(|q| *q <= 4);
    let year = positive(period.and_then(|p| p.year));
    let count = positive(period.and_then(|p| p.count));
    let start = non_blank(period.and_then(|p| p.start_date.as_ref()));
    let end = non_blank(period.and_then(|p| p.end_date.as_ref()));

    let mut query = ProviderQuery::new();
    let resolution = match frame {
        TimeFrame::LatestQuarter => {
            query.set("period", "quarter");
            query.set("limit", 1);
            WindowResolution::Resolved
        }
        TimeFrame::PreviousQuarter => {
            query.set("period", "quarter");
            query.set("limit", 2);
            WindowResolution::Resolved
        }
        TimeFrame::YearToDate => {
            query.set("period", "quarter");
            query.set("from", format!("{}-01-01", clock.current_year()));
            WindowResolution::Resolved
        }
        TimeFrame::TrailingTwelveMonths => {
            query.set("period", "quarter");
            query.set("limit", 4);
            WindowResolution::Resolved
        }
        TimeFrame::SpecificQuarter => match (quarter, year) {
            (Some(quarter), Some(year)) => {
                query.set("period", "quarter");
                query.set("year", year);
                query.set("quarter", quarter);
                WindowResolution::Resolved
            }
            _ => WindowResolution::Degraded,
        },
        TimeFrame::SpecificYear => match year {
            Some(year) => {
                query.set("period", "annual");
                query.set("year", year);
                WindowResolution::Resolved
            }
            None => WindowResolution::Degraded,
        },
        TimeFrame::SpecificDateRange => match (start, end) {
            (Some(start), Some(end)) => {
                query.set("from", start);
                query.set("to", end);
                WindowResolution::Resolved
            }
            _ => WindowResolution::Degraded,
        },
        TimeFrame::PastNQuarters => {
            query.set("period", "quarter");
            query.set("limit", count.unwrap_or(4));
            if count.is_some() {
                WindowResolution::Resolved
            } else {
                WindowResolution::Degraded
            }
        }
        TimeFrame::PastNYears => {
            query.set("period", "annual");
            query.set("limit", count.unwrap_or(1));
            if count.is_some() {
                WindowResolution::Resolved
            } else {
                WindowResolution::Degraded
            }
        }
        TimeFrame::NotSpecified => {
            query.set("period", "quarter");
            query.set("limit", 1);
            WindowResolution::Default
        }
    };

    TimeWindow { query, resolution }
}

//
// ================= Fetched Data =================
//

/// Provider records keyed by statement endpoint
pub type StatementRecords = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptData {
    pub ticker: String,
    pub transcripts: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveTranscripts {
    pub ticker: String,
    pub transcripts: Value,
    pub executives: Vec<String>,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonTranscripts {
    pub ticker: String,
    pub transcripts: Value,
    pub comparison_topic: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFinancials {
    pub ticker: String,
    pub statements: StatementRecords,
    pub profile: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricFinancials {
    pub ticker: String,
    pub statements: StatementRecords,
    pub transcripts: Value,
}

/// Provider data for one intent. Per-ticker lists follow the requested ticker order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchedData {
    TranscriptSummary(TranscriptData),
    ExecutiveStatements(Vec<ExecutiveTranscripts>),
    FinancialDataQuery(CompanyFinancials),
    MetricAnalysis(MetricFinancials),
    TranscriptComparison(Vec<ComparisonTranscripts>),
    MetricComparison(Vec<CompanyFinancials>),
}

//
// ================= Fetcher =================
//

fn require_ticker(ticker: &str) -> Result<&str> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        Err(ResearchError::TickerRequired("Ticker required".to_string()))
    } else {
        Ok(ticker)
    }
}

/// Blank tickers are skipped, not an error; having none left is.
fn usable_tickers(tickers: &[String]) -> Result<Vec<&str>> {
    let usable: Vec<&str> = tickers
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if usable.is_empty() {
        Err(ResearchError::TickerRequired(
            "At least one ticker required".to_string(),
        ))
    } else {
        Ok(usable)
    }
}

/// `previous_quarter` asks for two periods; the older one is the answer.
fn select_previous_quarter(frame: TimeFrame, transcripts: Value) -> Value {
    match transcripts {
        Value::Array(mut items) if frame == TimeFrame::PreviousQuarter && items.len() > 1 => {
            items.swap_remove(1)
        }
        other => other,
    }
}

pub struct DataFetcher {
    provider: Arc<dyn FinancialDataProvider>,
    clock: Arc<dyn Clock>,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn FinancialDataProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { provider, clock }
    }

    fn window(&self, frame: TimeFrame, period: Option<&SpecificPeriod>) -> ProviderQuery {
        let window = resolve_window(frame, period, self.clock.as_ref());
        match window.resolution {
            WindowResolution::Degraded => warn!(
                time_frame = %frame,
                period = ?period,
                query = %window.query,
                "Specific period incomplete; falling back to default window"
            ),
            resolution => debug!(time_frame = %frame, ?resolution, query = %window.query, "Time window"),
        }
        window.query
    }

    /// Fetch everything the query needs. The caller must not pass a result
    /// that carries an extraction error.
    pub async fn fetch(&self, result: &QueryResult) -> Result<FetchedData> {
        if let Some(error) = &result.error {
            return Err(ResearchError::InvalidQuery(error.clone()));
        }

        info!(intent = %result.intent_type(), "Fetching data");

        match &result.params {
            IntentParameters::TranscriptSummary(p) => {
                let ticker = require_ticker(&p.ticker)?;
                let query = self.window(p.time_frame, p.specific_period.as_ref());
                let transcripts = self.transcripts(ticker, &query).await?;

                Ok(FetchedData::TranscriptSummary(TranscriptData {
                    ticker: ticker.to_string(),
                    transcripts: select_previous_quarter(p.time_frame, transcripts),
                }))
            }
            IntentParameters::ExecutiveStatements(p) => {
                let tickers = usable_tickers(&p.tickers)?;
                let query = self.window(p.time_frame, p.specific_period.as_ref());

                let per_ticker = try_join_all(tickers.iter().map(|ticker| {
                    let query = &query;
                    async move {
                        let transcripts = self.transcripts(ticker, query).await?;
                        Ok::<_, ResearchError>(ExecutiveTranscripts {
                            ticker: ticker.to_string(),
                            transcripts,
                            executives: p.executives.clone(),
                            topics: p.topics.clone(),
                        })
                    }
                }))
                .await?;

                Ok(FetchedData::ExecutiveStatements(per_ticker))
            }
            IntentParameters::FinancialDataQuery(p) => {
                let ticker = require_ticker(&p.ticker)?;
                let query = self.window(p.time_frame, p.specific_period.as_ref());
                let statements = vocabulary::required_statements(&p.metrics);

                Ok(FetchedData::FinancialDataQuery(
                    self.company_financials(ticker, &statements, &query).await?,
                ))
            }
            IntentParameters::MetricAnalysis(p) => {
                let ticker = require_ticker(&p.ticker)?;
                let query = self.window(p.time_frame, p.specific_period.as_ref());
                let statements = vocabulary::required_statements(std::slice::from_ref(&p.metric));

                let (statements, transcripts) = tokio::try_join!(
                    self.statements(ticker, &statements, &query),
                    self.transcripts(ticker, &query),
                )?;

                Ok(FetchedData::MetricAnalysis(MetricFinancials {
                    ticker: ticker.to_string(),
                    statements,
                    transcripts,
                }))
            }
            IntentParameters::TranscriptComparison(p) => {
                let tickers = usable_tickers(&p.tickers)?;
                let query = self.window(p.time_frame, p.specific_period.as_ref());

                let per_ticker = try_join_all(tickers.iter().map(|ticker| {
                    let query = &query;
                    async move {
                        let transcripts = self.transcripts(ticker, query).await?;
                        Ok::<_, ResearchError>(ComparisonTranscripts {
                            ticker: ticker.to_string(),
                            transcripts,
                            comparison_topic: p.comparison_topic.clone(),
                        })
                    }
                }))
                .await?;

                Ok(FetchedData::TranscriptComparison(per_ticker))
            }
            IntentParameters::MetricComparison(p) => {
                let tickers = usable_tickers(&p.tickers)?;
                let query = self.window(p.time_frame, p.specific_period.as_ref());
                let statements = vocabulary::required_statements(&p.metrics);

                let per_ticker = try_join_all(
                    tickers
                        .iter()
                        .map(|ticker| self.company_financials(ticker, &statements, &query)),
                )
                .await?;

                Ok(FetchedData::MetricComparison(per_ticker))
            }
        }
    }

    async fn transcripts(&self, ticker: &str, query: &ProviderQuery) -> Result<Value> {
        self.provider.fetch(Endpoint::Transcript, ticker, query).await
    }

    async fn statements(
        &self,
        ticker: &str,
        categories: &[StatementCategory],
        query: &ProviderQuery,
    ) -> Result<StatementRecords> {
        let records = try_join_all(categories.iter().map(|category| async move {
            let data = self
                .provider
                .fetch(Endpoint::Statement(*category), ticker, query)
                .await?;
            Ok::<_, ResearchError>((category.endpoint().to_string(), data))
        }))
        .await?;

        Ok(records.into_iter().collect())
    }

    /// Statements plus company profile. The profile takes no window.
    async fn company_financials(
        &self,
        ticker: &str,
        categories: &[StatementCategory],
        query: &ProviderQuery,
    ) -> Result<CompanyFinancials> {
        let no_window = ProviderQuery::new();
        let (statements, profile) = tokio::try_join!(
            self.statements(ticker, categories, query),
            self.provider.fetch(Endpoint::Profile, ticker, &no_window),
        )?;

        Ok(CompanyFinancials {
            ticker: ticker.to_string(),
            statements,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{
        ExecutiveStatementsParams, FinancialDataParams, IntentType, MetricAnalysisParams,
        MetricComparisonParams, TranscriptSummaryParams,
    };
    use crate::provider::StaticProvider;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn clock() -> FixedClock {
        FixedClock::ymd(2024, 5, 17)
    }

    fn fetcher(provider: Arc<StaticProvider>) -> DataFetcher {
        DataFetcher::new(provider, Arc::new(clock()))
    }

    fn period(f: impl FnOnce(&mut SpecificPeriod)) -> SpecificPeriod {
        let mut period = SpecificPeriod::default();
        f(&mut period);
        period
    }

    #[test]
    fn test_window_mapping() {
        let clock = clock();
        let cases = [
            (TimeFrame::LatestQuarter, None, "period=quarter&limit=1", WindowResolution::Resolved),
            (TimeFrame::PreviousQuarter, None, "period=quarter&limit=2", WindowResolution::Resolved),
            (TimeFrame::YearToDate, None, "period=quarter&from=2024-01-01", WindowResolution::Resolved),
            (TimeFrame::TrailingTwelveMonths, None, "period=quarter&limit=4", WindowResolution::Resolved),
            (
                TimeFrame::SpecificQuarter,
                Some(period(|p| {
                    p.quarter = Some(3);
                    p.year = Some(2023);
                })),
                "period=quarter&year=2023&quarter=3",
                WindowResolution::Resolved,
            ),
            (
                TimeFrame::SpecificYear,
                Some(period(|p| p.year = Some(2023))),
                "period=annual&year=2023",
                WindowResolution::Resolved,
            ),
            (
                TimeFrame::SpecificDateRange,
                Some(period(|p| {
                    p.start_date = Some("2023-01-01".to_string());
                    p.end_date = Some("2023-06-30".to_string());
                })),
                "from=2023-01-01&to=2023-06-30",
                WindowResolution::Resolved,
            ),
            (
                TimeFrame::PastNQuarters,
                Some(period(|p| p.count = Some(8))),
                "period=quarter&limit=8",
                WindowResolution::Resolved,
            ),
            (
                TimeFrame::PastNYears,
                Some(period(|p| p.count = Some(2))),
                "period=annual&limit=2",
                WindowResolution::Resolved,
            ),
            (TimeFrame::NotSpecified, None, "period=quarter&limit=1", WindowResolution::Default),
        ];

        for (frame, period, expected, resolution) in cases {
            let window = resolve_window(frame, period.as_ref(), &clock);
            assert_eq!(window.query.to_string(), expected, "{}", frame);
            assert_eq!(window.resolution, resolution, "{}", frame);
        }
    }

    #[test]
    fn test_noisy_model_period_degrades() {
        let noisy: SpecificPeriod =
            serde_json::from_value(serde_json::json!({ "count": -1 })).unwrap();
        let window = resolve_window(TimeFrame::PastNQuarters, Some(&noisy), &clock());
        assert_eq!(window.query.to_string(), "period=quarter&limit=4");
        assert_eq!(window.resolution, WindowResolution::Degraded);

        let noisy: SpecificPeriod =
            serde_json::from_value(serde_json::json!({ "quarter": 300, "year": 2023 })).unwrap();
        let window = resolve_window(TimeFrame::SpecificQuarter, Some(&noisy), &clock());
        assert!(window.query.is_empty());
        assert_eq!(window.resolution, WindowResolution::Degraded);
    }

    #[test]
    fn test_incomplete_period_degrades_distinctly() {
        let clock = clock();

        let quarter_only = period(|p| p.quarter = Some(2));
        let window = resolve_window(TimeFrame::SpecificQuarter, Some(&quarter_only), &clock);
        assert!(window.query.is_empty());
        assert_eq!(window.resolution, WindowResolution::Degraded);

        let bad_quarter = period(|p| {
            p.quarter = Some(7);
            p.year = Some(2023);
        });
        let window = resolve_window(TimeFrame::SpecificQuarter, Some(&bad_quarter), &clock);
        assert_eq!(window.resolution, WindowResolution::Degraded);

        let window = resolve_window(TimeFrame::SpecificYear, None, &clock);
        assert!(window.query.is_empty());
        assert_eq!(window.resolution, WindowResolution::Degraded);

        let window = resolve_window(TimeFrame::PastNYears, None, &clock);
        assert_eq!(window.query.to_string(), "period=annual&limit=1");
        assert_eq!(window.resolution, WindowResolution::Degraded);

        let zero = period(|p| p.count = Some(0));
        let window = resolve_window(TimeFrame::PastNQuarters, Some(&zero), &clock);
        assert_eq!(window.query.to_string(), "period=quarter&limit=4");
    }

    #[tokio::test]
    async fn test_financial_data_fetches_statements_and_profile() {
        let provider = Arc::new(
            StaticProvider::new()
                .with_data(
                    Endpoint::Statement(StatementCategory::IncomeStatement),
                    "AAPL",
                    json!([{ "calendarYear": "2023", "revenue": 383285000000u64 }]),
                )
                .with_data(Endpoint::Profile, "AAPL", json!([{ "companyName": "Apple Inc." }])),
        );

        let result = QueryResult::ok(IntentParameters::FinancialDataQuery(FinancialDataParams {
            company: "Apple".to_string(),
            ticker: "AAPL".to_string(),
            metrics: vec!["revenue".to_string()],
            time_frame: TimeFrame::SpecificYear,
            specific_period: Some(period(|p| p.year = Some(2023))),
            ..Default::default()
        }));

        let data = fetcher(provider.clone()).fetch(&result).await.unwrap();

        match &data {
            FetchedData::FinancialDataQuery(company) => {
                assert_eq!(company.ticker, "AAPL");
                assert_eq!(
                    company.statements["income-statement"][0]["revenue"],
                    json!(383285000000u64)
                );
                assert_eq!(company.profile[0]["companyName"], "Apple Inc.");
            }
            other => panic!("unexpected data: {:?}", other),
        }

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        let statement_call = calls
            .iter()
            .find(|c| c.endpoint == Endpoint::Statement(StatementCategory::IncomeStatement))
            .unwrap();
        assert_eq!(statement_call.query.to_string(), "period=annual&year=2023");
        let profile_call = calls.iter().find(|c| c.endpoint == Endpoint::Profile).unwrap();
        assert!(profile_call.query.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_is_idempotent() {
        let provider = Arc::new(
            StaticProvider::new()
                .with_data(Endpoint::Transcript, "MSFT", json!([{ "quarter": 1, "content": "..." }])),
        );
        let fetcher = fetcher(provider);
        let result = QueryResult::ok(IntentParameters::TranscriptSummary(TranscriptSummaryParams {
            company: "Microsoft".to_string(),
            ticker: "MSFT".to_string(),
            ..Default::default()
        }));

        let first = fetcher.fetch(&result).await.unwrap();
        let second = fetcher.fetch(&result).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_previous_quarter_selects_second_transcript() {
        let provider = Arc::new(StaticProvider::new().with_data(
            Endpoint::Transcript,
            "TSLA",
            json!([{ "quarter": 4 }, { "quarter": 3 }]),
        ));
        let result = QueryResult::ok(IntentParameters::TranscriptSummary(TranscriptSummaryParams {
            ticker: "TSLA".to_string(),
            time_frame: TimeFrame::PreviousQuarter,
            ..Default::default()
        }));

        match fetcher(provider).fetch(&result).await.unwrap() {
            FetchedData::TranscriptSummary(data) => {
                assert_eq!(data.transcripts, json!({ "quarter": 3 }))
            }
            other => panic!("unexpected data: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_tickers_are_skipped_in_order() {
        let provider = Arc::new(
            StaticProvider::new()
                .with_data(Endpoint::Transcript, "AMZN", json!([{ "symbol": "AMZN" }]))
                .with_data(Endpoint::Transcript, "MSFT", json!([{ "symbol": "MSFT" }])),
        );
        let result = QueryResult::ok(IntentParameters::ExecutiveStatements(
            ExecutiveStatementsParams {
                executives: vec!["Andy Jassy".to_string()],
                tickers: vec!["AMZN".to_string(), "".to_string(), " MSFT ".to_string()],
                topics: vec!["AWS growth".to_string()],
                ..Default::default()
            },
        ));

        match fetcher(provider.clone()).fetch(&result).await.unwrap() {
            FetchedData::ExecutiveStatements(per_ticker) => {
                let tickers: Vec<&str> = per_ticker.iter().map(|t| t.ticker.as_str()).collect();
                assert_eq!(tickers, vec!["AMZN", "MSFT"]);
                assert_eq!(per_ticker[0].topics, vec!["AWS growth"]);
            }
            other => panic!("unexpected data: {:?}", other),
        }
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_metric_comparison_per_ticker() {
        let income = Endpoint::Statement(StatementCategory::IncomeStatement);
        let provider = Arc::new(
            StaticProvider::new()
                .with_data(income, "AAPL", json!([{ "revenue": 1 }]))
                .with_data(income, "MSFT", json!([{ "revenue": 2 }]))
                .with_data(Endpoint::Profile, "AAPL", json!([{}]))
                .with_data(Endpoint::Profile, "MSFT", json!([{}])),
        );
        let result = QueryResult::ok(IntentParameters::MetricComparison(MetricComparisonParams {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            metrics: vec!["revenue".to_string()],
            ..Default::default()
        }));

        match fetcher(provider.clone()).fetch(&result).await.unwrap() {
            FetchedData::MetricComparison(companies) => {
                assert_eq!(companies.len(), 2);
                assert_eq!(companies[1].ticker, "MSFT");
                assert_eq!(companies[1].statements["income-statement"], json!([{ "revenue": 2 }]));
            }
            other => panic!("unexpected data: {:?}", other),
        }
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_metric_analysis_fetches_transcripts_too() {
        let provider = Arc::new(
            StaticProvider::new()
                .with_data(
                    Endpoint::Statement(StatementCategory::Ratios),
                    "NVDA",
                    json!([{ "netProfitMargin": 0.48 }]),
                )
                .with_data(Endpoint::Transcript, "NVDA", json!([{ "content": "margins" }])),
        );
        let result = QueryResult::ok(IntentParameters::MetricAnalysis(MetricAnalysisParams {
            ticker: "NVDA".to_string(),
            metric: "profit margin".to_string(),
            ..Default::default()
        }));

        match fetcher(provider).fetch(&result).await.unwrap() {
            FetchedData::MetricAnalysis(data) => {
                assert!(data.statements.contains_key("ratios"));
                assert_eq!(data.transcripts[0]["content"], "margins");
            }
            other => panic!("unexpected data: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failures_are_hard_errors() {
        let provider = Arc::new(
            StaticProvider::new()
                .with_data(Endpoint::Transcript, "AAPL", json!([]))
                .with_status(Endpoint::Transcript, "MSFT", 500),
        );
        let fetcher = fetcher(provider);

        let empty = QueryResult::ok(IntentParameters::TranscriptSummary(TranscriptSummaryParams {
            ticker: "AAPL".to_string(),
            ..Default::default()
        }));
        assert!(matches!(
            fetcher.fetch(&empty).await,
            Err(ResearchError::EmptyResponse(_))
        ));

        let status = QueryResult::ok(IntentParameters::TranscriptSummary(TranscriptSummaryParams {
            ticker: "MSFT".to_string(),
            ..Default::default()
        }));
        assert!(matches!(
            fetcher.fetch(&status).await,
            Err(ResearchError::ProviderError { status: 500, .. })
        ));

        let no_ticker = QueryResult::ok(IntentParameters::empty(IntentType::FinancialDataQuery));
        assert!(matches!(
            fetcher.fetch(&no_ticker).await,
            Err(ResearchError::TickerRequired(_))
        ));

        let errored = QueryResult::failed(IntentType::TranscriptSummary, "nope");
        assert!(matches!(
            fetcher.fetch(&errored).await,
            Err(ResearchError::InvalidQuery(_))
        ));
    }
}
