//! Listing lookup
//!
//! Resolves a ticker and share count into a portfolio [`Listing`]: company
//! profile plus the handful of market metrics the portfolio summary uses.

use crate::error::ResearchError;
use crate::portfolio::{Listing, ListingMetrics, NetMargin};
use crate::provider::MarketDataProvider;
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const MISSING_PROPERTIES: &str = "missing required properties";
pub const INVALID_TICKER: &str = "Invalid ticker";

pub struct ListingLookup {
    provider: Arc<dyn MarketDataProvider>,
}

impl ListingLookup {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Both fields are required; zero or negative shares count as missing.
    /// An unknown ticker is `InvalidRequest(INVALID_TICKER)`.
    pub async fn lookup(&self, ticker: Option<&str>, shares: Option<f64>) -> Result<Listing> {
        let ticker = ticker.map(str::trim).filter(|t| !t.is_empty());
        let shares = shares.filter(|s| s.is_finite() && *s > 0.0);
        let (Some(ticker), Some(shares)) = (ticker, shares) else {
            return Err(ResearchError::InvalidRequest(MISSING_PROPERTIES.to_string()));
        };

        let (profile, financials) = tokio::try_join!(
            self.provider.company_profile(ticker),
            self.provider.basic_financials(ticker),
        )?;

        if is_empty_object(&profile) || is_empty_object(&financials) {
            warn!(ticker = %ticker, "Listing lookup found no company");
            return Err(ResearchError::InvalidRequest(INVALID_TICKER.to_string()));
        }

        let listing = build_listing(&profile, &financials, shares);
        info!(ticker = %listing.ticker, shares, "Listing resolved");
        Ok(listing)
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().map_or(true, |o| o.is_empty())
}

fn text(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn number(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or_default()
}

/// Missing fields fall back to empty strings and zeros.
pub fn build_listing(profile: &Value, financials: &Value, shares: f64) -> Listing {
    let metric = &financials["metric"];
    let net_margin = &financials["series"]["annual"]["netMargin"][0];

    Listing {
        ticker: text(profile, "ticker"),
        name: text(profile, "name"),
        user_shares: shares,
        industry: text(profile, "finnhubIndustry"),
        exchange: text(profile, "exchange"),
        currency: text(profile, "currency"),
        logo_url: text(profile, "logo"),
        market_capitalization: number(profile, "marketCapitalization"),
        share_outstanding: number(profile, "shareOutstanding"),
        metrics: ListingMetrics {
            ten_day_average_trading_volume: number(metric, "10DayAverageTradingVolume"),
            week_52_high: number(metric, "52WeekHigh"),
            week_52_low: number(metric, "52WeekLow"),
            week_52_low_date: text(metric, "52WeekLowDate"),
            week_52_price_return_daily: number(metric, "52WeekPriceReturnDaily"),
            beta: number(metric, "beta"),
            net_margin: NetMargin {
                period: text(net_margin, "period"),
                v: number(net_margin, "v"),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticMarketData;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn apple() -> (Value, Value) {
        (
            json!({
                "ticker": "AAPL",
                "name": "Apple Inc",
                "finnhubIndustry": "Technology",
                "exchange": "NASDAQ NMS - GLOBAL MARKET",
                "currency": "USD",
                "logo": "https://static.finnhub.io/logo/aapl.png",
                "marketCapitalization": 2950000.0,
                "shareOutstanding": 15550.0
            }),
            json!({
                "metric": {
                    "10DayAverageTradingVolume": 52.1,
                    "52WeekHigh": 199.62,
                    "52WeekLow": 164.08,
                    "52WeekLowDate": "2023-10-26",
                    "52WeekPriceReturnDaily": 12.4,
                    "beta": 1.29
                },
                "series": { "annual": { "netMargin": [
                    { "period": "2023-09-30", "v": 0.2531 },
                    { "period": "2022-09-24", "v": 0.2531 }
                ] } }
            }),
        )
    }

    fn lookup(provider: StaticMarketData) -> ListingLookup {
        ListingLookup::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_lookup_builds_listing() {
        let (profile, financials) = apple();
        let listing = lookup(StaticMarketData::new().with_company("AAPL", profile, financials))
            .lookup(Some(" AAPL "), Some(12.0))
            .await
            .unwrap();

        assert_eq!(listing.ticker, "AAPL");
        assert_eq!(listing.user_shares, 12.0);
        assert_eq!(listing.industry, "Technology");
        assert_eq!(listing.logo_url, "https://static.finnhub.io/logo/aapl.png");
        assert_eq!(listing.metrics.beta, 1.29);
        assert_eq!(listing.metrics.week_52_low_date, "2023-10-26");
        assert_eq!(listing.metrics.net_margin.period, "2023-09-30");
    }

    #[tokio::test]
    async fn test_missing_properties_skip_provider() {
        let provider = Arc::new(StaticMarketData::new());
        let lookup = ListingLookup::new(provider.clone());

        for (ticker, shares) in [(None, Some(3.0)), (Some("AAPL"), None), (Some(" "), Some(1.0)), (Some("AAPL"), Some(0.0))] {
            match lookup.lookup(ticker, shares).await {
                Err(ResearchError::InvalidRequest(message)) => assert_eq!(message, MISSING_PROPERTIES),
                other => panic!("expected invalid request, got {:?}", other),
            }
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_invalid() {
        match lookup(StaticMarketData::new()).lookup(Some("ZZZZ"), Some(1.0)).await {
            Err(ResearchError::InvalidRequest(message)) => assert_eq!(message, INVALID_TICKER),
            other => panic!("expected invalid ticker, got {:?}", other),
        }
    }

    #[test]
    fn test_sparse_payload_defaults() {
        let listing = build_listing(&json!({ "ticker": "XYZ" }), &json!({ "metric": {} }), 5.0);
        assert_eq!(listing.name, "");
        assert_eq!(listing.metrics.net_margin, NetMargin::default());
        assert_eq!(listing.current_price(), 0.0);
    }
}
