//! In-memory provider serving canned records
//!
//! Applies the same payload checks as the live client, so an empty canned
//! collection fails the way an empty provider response would.

use super::{check_payload, Endpoint, FinancialDataProvider, MarketDataProvider, ProviderQuery};
use crate::error::ResearchError;
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub endpoint: Endpoint,
    pub ticker: String,
    pub query: ProviderQuery,
}

#[derive(Debug, Clone)]
enum Canned {
    Data(Value),
    Status(u16),
}

#[derive(Default)]
pub struct StaticProvider {
    responses: HashMap<(Endpoint, String), Canned>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, endpoint: Endpoint, ticker: &str, data: Value) -> Self {
        self.responses
            .insert((endpoint, ticker.to_string()), Canned::Data(data));
        self
    }

    pub fn with_status(mut self, endpoint: Endpoint, ticker: &str, status: u16) -> Self {
        self.responses
            .insert((endpoint, ticker.to_string()), Canned::Status(status));
        self
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<ProviderCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }
}

#[async_trait]
impl FinancialDataProvider for StaticProvider {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        ticker: &str,
        query: &ProviderQuery,
    ) -> Result<Value> {
        self.lock_calls().push(ProviderCall {
            endpoint,
            ticker: ticker.to_string(),
            query: query.clone(),
        });

        let path = endpoint.path(ticker);
        match self.responses.get(&(endpoint, ticker.to_string())) {
            Some(Canned::Data(data)) => check_payload(&path, data.clone()),
            Some(Canned::Status(status)) => Err(ResearchError::ProviderError {
                status: *status,
                endpoint: path,
                detail: "canned failure".to_string(),
            }),
            None => Err(ResearchError::ProviderError {
                status: 404,
                endpoint: path,
                detail: "Not Found".to_string(),
            }),
        }
    }
}

/// Canned listing data. Unknown tickers get empty objects, which is what
/// the live service answers for a symbol it does not know.
#[derive(Default)]
pub struct StaticMarketData {
    companies: HashMap<String, (Value, Value)>,
    calls: Mutex<usize>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, ticker: &str, profile: Value, financials: Value) -> Self {
        self.companies
            .insert(ticker.to_string(), (profile, financials));
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self) {
        *self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn company_profile(&self, ticker: &str) -> Result<Value> {
        self.record();
        Ok(self
            .companies
            .get(ticker)
            .map(|(profile, _)| profile.clone())
            .unwrap_or_else(|| json!({})))
    }

    async fn basic_financials(&self, ticker: &str) -> Result<Value> {
        self.record();
        Ok(self
            .companies
            .get(ticker)
            .map(|(_, financials)| financials.clone())
            .unwrap_or_else(|| json!({})))
    }
}
