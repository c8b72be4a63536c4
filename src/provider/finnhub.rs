//! Finnhub client for portfolio listing lookups

use super::{join_segments, parse_base_url, MarketDataProvider};
use crate::config::FinnhubConfig;
use crate::error::ResearchError;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl FinnhubClient {
    pub fn new(config: &FinnhubConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    async fn get(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Value> {
        if self.api_key.is_empty() {
            return Err(ResearchError::ConfigError(
                "FINNHUB_API_KEY not configured".to_string(),
            ));
        }

        let label = format!("/{}", segments.join("/"));
        let url = join_segments(&self.base_url, segments);
        debug!(url = %url, params = ?params, "Fetching from Finnhub");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %label, "Finnhub request failed: {}", e);
                ResearchError::ProviderError {
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    endpoint: label.clone(),
                    detail: e.without_url().to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(endpoint = %label, status = status.as_u16(), "Finnhub returned an error status");
            return Err(ResearchError::ProviderError {
                status: status.as_u16(),
                endpoint: label,
                detail: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ResearchError::ProviderError {
                status: status.as_u16(),
                endpoint: label,
                detail: format!("Invalid JSON response: {}", e.without_url()),
            })
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubClient {
    async fn company_profile(&self, ticker: &str) -> Result<Value> {
        self.get(&["stock", "profile2"], &[("symbol", ticker)]).await
    }

    async fn basic_financials(&self, ticker: &str) -> Result<Value> {
        self.get(&["stock", "metric"], &[("symbol", ticker), ("metric", "all")])
            .await
    }
}
