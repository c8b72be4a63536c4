//! Financial Modeling Prep (v3) client

use super::{
    check_payload, join_segments, parse_base_url, Endpoint, FinancialDataProvider, ProviderQuery,
};
use crate::config::FmpConfig;
use crate::error::ResearchError;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl FmpClient {
    pub fn new(config: &FmpConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: parse_base_url(&config.base_url)?,
        })
    }
}

#[async_trait]
impl FinancialDataProvider for FmpClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        ticker: &str,
        query: &ProviderQuery,
    ) -> Result<Value> {
        let path = endpoint.path(ticker);
        let url = join_segments(&self.base_url, &[endpoint.segment(), ticker]);

        // Key stays out of the logs
        debug!(url = %url, query = %query, "Fetching from FMP");

        let response = self
            .client
            .get(url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query.pairs())
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %path, "FMP request failed: {}", e);
                ResearchError::ProviderError {
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    endpoint: path.clone(),
                    detail: e.without_url().to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
            error!(endpoint = %path, status = status.as_u16(), "FMP returned an error status");
            return Err(ResearchError::ProviderError {
                status: status.as_u16(),
                endpoint: path,
                detail,
            });
        }

        let payload = response.json::<Value>().await.map_err(|e| {
            ResearchError::ProviderError {
                status: status.as_u16(),
                endpoint: path.clone(),
                detail: format!("Invalid JSON response: {}", e.without_url()),
            }
        })?;

        check_payload(&path, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::StatementCategory;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> FmpClient {
        FmpClient::new(&FmpConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_key_and_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/income-statement/AAPL"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("period", "annual"))
            .and(query_param("year", "2023"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "date": "2023-09-30", "revenue": 383285000000u64 }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let query = ProviderQuery::new().with("period", "annual").with("year", 2023);
        let data = client(&server)
            .fetch(
                Endpoint::Statement(StatementCategory::IncomeStatement),
                "AAPL",
                &query,
            )
            .await
            .unwrap();

        assert_eq!(data[0]["revenue"], json!(383285000000u64));
    }

    #[tokio::test]
    async fn test_ticker_stays_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/BRK%2FB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "symbol": "BRK-B" }])))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server)
            .fetch(Endpoint::Profile, "BRK/B", &ProviderQuery::new())
            .await
            .unwrap();
        assert_eq!(data[0]["symbol"], "BRK-B");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = FmpClient::new(&FmpConfig {
            api_key: "k".to_string(),
            base_url: "financialmodelingprep".to_string(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(ResearchError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_empty_array_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/earning_call_transcript/ZZZZ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let result = client(&server)
            .fetch(Endpoint::Transcript, "ZZZZ", &ProviderQuery::new())
            .await;

        assert!(matches!(result, Err(ResearchError::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = client(&server)
            .fetch(Endpoint::Profile, "AAPL", &ProviderQuery::new())
            .await;

        match result {
            Err(ResearchError::ProviderError { status, endpoint, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(endpoint, "/profile/AAPL");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
