//! Financial data provider trait and implementations

use crate::error::ResearchError;
use crate::vocabulary::StatementCategory;
use crate::Result;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::fmt;

pub mod finnhub;
pub mod fixture;
pub mod fmp;

pub use finnhub::FinnhubClient;
pub use fixture::{StaticMarketData, StaticProvider};
pub use fmp::FmpClient;

/// Provider resources the fetcher knows how to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Statement(StatementCategory),
    Profile,
    Transcript,
}

impl Endpoint {
    pub fn segment(&self) -> &'static str {
        match self {
            Endpoint::Statement(category) => category.endpoint(),
            Endpoint::Profile => "profile",
            Endpoint::Transcript => "earning_call_transcript",
        }
    }

    /// Log and error label, e.g. `/income-statement/AAPL`. Request URLs are
    /// built with [`join_segments`].
    pub fn path(&self, ticker: &str) -> String {
        format!("/{}/{}", self.segment(), ticker)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment())
    }
}

/// Ordered query parameters for one provider call
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProviderQuery {
    params: Vec<(String, String)>,
}

impl ProviderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`, keeping first-insertion order
    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }
}

impl fmt::Display for ProviderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        write!(f, "{}", joined)
    }
}

/// Source of provider records, one call per endpoint and ticker
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint, ticker: &str, query: &ProviderQuery)
        -> Result<Value>;
}

/// Company profile and basic financials, used to build portfolio listings
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn company_profile(&self, ticker: &str) -> Result<Value>;

    async fn basic_financials(&self, ticker: &str) -> Result<Value>;
}

/// Parse a configured provider base URL
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url.trim()).map_err(|e| {
        ResearchError::ConfigError(format!("invalid provider base URL '{}': {}", base_url, e))
    })?;
    if url.cannot_be_a_base() {
        return Err(ResearchError::ConfigError(format!(
            "provider base URL '{}' cannot take a path",
            base_url
        )));
    }
    Ok(url)
}

/// Append path segments to `base`, each percent-encoded, so a ticker such as
/// `BRK/B` stays a single segment.
pub fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Provider-level payload checks shared by every implementation.
///
/// An empty collection or an `{"Error Message": ...}` body is a failure,
/// never "no data".
pub fn check_payload(endpoint: &str, payload: Value) -> Result<Value> {
    if let Some(message) = payload.get("Error Message").and_then(|m| m.as_str()) {
        return Err(ResearchError::ProviderError {
            status: 200,
            endpoint: endpoint.to_string(),
            detail: message.to_string(),
        });
    }

    match &payload {
        Value::Array(items) if items.is_empty() => {
            Err(ResearchError::EmptyResponse(endpoint.to_string()))
        }
        _ => Ok(payload),
    }
}
