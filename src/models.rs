//! Core data models for the research pipeline

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

//
// ================= Conversation =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single conversation turn. The caller owns the history; the pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

//
// ================= Intents =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    TranscriptSummary,
    ExecutiveStatements,
    FinancialDataQuery,
    MetricAnalysis,
    TranscriptComparison,
    MetricComparison,
}

impl IntentType {
    pub const ALL: [IntentType; 6] = [
        IntentType::TranscriptSummary,
        IntentType::ExecutiveStatements,
        IntentType::FinancialDataQuery,
        IntentType::MetricAnalysis,
        IntentType::TranscriptComparison,
        IntentType::MetricComparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::TranscriptSummary => "TRANSCRIPT_SUMMARY",
            IntentType::ExecutiveStatements => "EXECUTIVE_STATEMENTS",
            IntentType::FinancialDataQuery => "FINANCIAL_DATA_QUERY",
            IntentType::MetricAnalysis => "METRIC_ANALYSIS",
            IntentType::TranscriptComparison => "TRANSCRIPT_COMPARISON",
            IntentType::MetricComparison => "METRIC_COMPARISON",
        }
    }
}

//
// ================= Time =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrame {
    LatestQuarter,
    PreviousQuarter,
    YearToDate,
    TrailingTwelveMonths,
    SpecificQuarter,
    SpecificYear,
    SpecificDateRange,
    PastNQuarters,
    PastNYears,
    #[default]
    NotSpecified,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 10] = [
        TimeFrame::LatestQuarter,
        TimeFrame::PreviousQuarter,
        TimeFrame::YearToDate,
        TimeFrame::TrailingTwelveMonths,
        TimeFrame::SpecificQuarter,
        TimeFrame::SpecificYear,
        TimeFrame::SpecificDateRange,
        TimeFrame::PastNQuarters,
        TimeFrame::PastNYears,
        TimeFrame::NotSpecified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::LatestQuarter => "latest_quarter",
            TimeFrame::PreviousQuarter => "previous_quarter",
            TimeFrame::YearToDate => "year_to_date",
            TimeFrame::TrailingTwelveMonths => "trailing_twelve_months",
            TimeFrame::SpecificQuarter => "specific_quarter",
            TimeFrame::SpecificYear => "specific_year",
            TimeFrame::SpecificDateRange => "specific_date_range",
            TimeFrame::PastNQuarters => "past_n_quarters",
            TimeFrame::PastNYears => "past_n_years",
            TimeFrame::NotSpecified => "not_specified",
        }
    }
}

/// Concrete refinement of a [`TimeFrame`]. Every field is optional; the
/// fetcher falls back to the time frame's default window when one is missing.
///
/// Model output is noisy, so fields are read leniently: `2023.0` and `"2023"`
/// are the year 2023, while negative, fractional or out-of-range numbers are
/// treated as missing rather than failing the whole extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecificPeriod {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_int")]
    pub quarter: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_int")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_int")]
    pub count: Option<u32>,
}

fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let whole = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(whole.and_then(|n| T::try_from(n).ok()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// A period that is not an object at all (`"Q3 2023"`) is dropped.
fn lenient_period<'de, D>(deserializer: D) -> Result<Option<SpecificPeriod>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(Value::is_object)
        .and_then(|value| serde_json::from_value(value).ok()))
}

//
// ================= Intent Parameters =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    SingleValue,
    TimeSeries,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    PointInTime,
    Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptSummaryParams {
    pub company: String,
    pub ticker: String,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_period")]
    pub specific_period: Option<SpecificPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutiveStatementsParams {
    pub executives: Vec<String>,
    pub companies: Vec<String>,
    pub tickers: Vec<String>,
    pub topics: Vec<String>,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_period")]
    pub specific_period: Option<SpecificPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialDataParams {
    pub company: String,
    pub ticker: String,
    pub metrics: Vec<String>,
    pub data_type: DataType,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_period")]
    pub specific_period: Option<SpecificPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricAnalysisParams {
    pub company: String,
    pub ticker: String,
    pub metric: String,
    pub analysis_type: AnalysisType,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_period")]
    pub specific_period: Option<SpecificPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptComparisonParams {
    pub companies: Vec<String>,
    pub tickers: Vec<String>,
    pub comparison_topic: String,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_period")]
    pub specific_period: Option<SpecificPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricComparisonParams {
    pub companies: Vec<String>,
    pub tickers: Vec<String>,
    pub metrics: Vec<String>,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_period")]
    pub specific_period: Option<SpecificPeriod>,
}

/// Typed parameters, one variant per intent. Serialized as `{type, data}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentParameters {
    TranscriptSummary(TranscriptSummaryParams),
    ExecutiveStatements(ExecutiveStatementsParams),
    FinancialDataQuery(FinancialDataParams),
    MetricAnalysis(MetricAnalysisParams),
    TranscriptComparison(TranscriptComparisonParams),
    MetricComparison(MetricComparisonParams),
}

impl IntentParameters {
    /// Intent-shaped placeholder: empty strings and arrays, `not_specified` time frame.
    pub fn empty(intent: IntentType) -> Self {
        match intent {
            IntentType::TranscriptSummary => Self::TranscriptSummary(Default::default()),
            IntentType::ExecutiveStatements => Self::ExecutiveStatements(Default::default()),
            IntentType::FinancialDataQuery => Self::FinancialDataQuery(Default::default()),
            IntentType::MetricAnalysis => Self::MetricAnalysis(Default::default()),
            IntentType::TranscriptComparison => Self::TranscriptComparison(Default::default()),
            IntentType::MetricComparison => Self::MetricComparison(Default::default()),
        }
    }

    /// Decode the model's structured output into the variant for `intent`.
    pub fn from_value(intent: IntentType, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match intent {
            IntentType::TranscriptSummary => Self::TranscriptSummary(serde_json::from_value(value)?),
            IntentType::ExecutiveStatements => {
                Self::ExecutiveStatements(serde_json::from_value(value)?)
            }
            IntentType::FinancialDataQuery => Self::FinancialDataQuery(serde_json::from_value(value)?),
            IntentType::MetricAnalysis => Self::MetricAnalysis(serde_json::from_value(value)?),
            IntentType::TranscriptComparison => {
                Self::TranscriptComparison(serde_json::from_value(value)?)
            }
            IntentType::MetricComparison => Self::MetricComparison(serde_json::from_value(value)?),
        })
    }

    pub fn intent_type(&self) -> IntentType {
        match self {
            Self::TranscriptSummary(_) => IntentType::TranscriptSummary,
            Self::ExecutiveStatements(_) => IntentType::ExecutiveStatements,
            Self::FinancialDataQuery(_) => IntentType::FinancialDataQuery,
            Self::MetricAnalysis(_) => IntentType::MetricAnalysis,
            Self::TranscriptComparison(_) => IntentType::TranscriptComparison,
            Self::MetricComparison(_) => IntentType::MetricComparison,
        }
    }

    pub fn time_frame(&self) -> TimeFrame {
        match self {
            Self::TranscriptSummary(p) => p.time_frame,
            Self::ExecutiveStatements(p) => p.time_frame,
            Self::FinancialDataQuery(p) => p.time_frame,
            Self::MetricAnalysis(p) => p.time_frame,
            Self::TranscriptComparison(p) => p.time_frame,
            Self::MetricComparison(p) => p.time_frame,
        }
    }
}

//
// ================= Query Results =================
//

/// Per-intent outcome of parameter extraction, with its own error slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResult {
    #[serde(flatten)]
    pub params: IntentParameters,
    pub error: Option<String>,
}

impl QueryResult {
    pub fn ok(params: IntentParameters) -> Self {
        Self {
            params,
            error: None,
        }
    }

    pub fn failed(intent: IntentType, error: impl Into<String>) -> Self {
        Self {
            params: IntentParameters::empty(intent),
            error: Some(error.into()),
        }
    }

    pub fn intent_type(&self) -> IntentType {
        self.params.intent_type()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A single result stays unwrapped; several keep the classifier's ranking.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryOutcome {
    Single(QueryResult),
    Multiple(Vec<QueryResult>),
}

impl QueryOutcome {
    pub fn from_results(mut results: Vec<QueryResult>) -> Self {
        if results.len() == 1 {
            if let Some(result) = results.pop() {
                return QueryOutcome::Single(result);
            }
        }
        QueryOutcome::Multiple(results)
    }

    pub fn results(&self) -> &[QueryResult] {
        match self {
            QueryOutcome::Single(result) => std::slice::from_ref(result),
            QueryOutcome::Multiple(results) => results,
        }
    }

    pub fn len(&self) -> usize {
        self.results().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryAnalysisResult {
    /// Ranked by relevance; the first entry gates on confidence.
    pub query_types: Vec<IntentType>,
    pub confidence_score: f64,
    pub clarify_question: String,
}

impl QueryAnalysisResult {
    pub fn primary(&self) -> Option<IntentType> {
        self.query_types.first().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextAnalysisResult {
    pub is_continuation: bool,
    pub response: String,
}

impl ContextAnalysisResult {
    pub fn new_topic() -> Self {
        Self::default()
    }
}

//
// ================= Chat Response =================
//

/// Externally visible outcome of one user turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatResponse {
    ClarificationNeeded { message: String },
    DirectResponse { message: String },
    Answer { message: String },
}

impl ChatResponse {
    pub fn message(&self) -> &str {
        match self {
            ChatResponse::ClarificationNeeded { message }
            | ChatResponse::DirectResponse { message }
            | ChatResponse::Answer { message } => message,
        }
    }

    pub fn needs_clarification(&self) -> bool {
        matches!(self, ChatResponse::ClarificationNeeded { .. })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
