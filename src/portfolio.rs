//! Portfolio chat
//!
//! Free-text chat about a user-assembled portfolio. The listings and a
//! computed summary are embedded in the system prompt; no intent pipeline.

use crate::error::ResearchError;
use crate::llm::{CompletionOptions, LanguageModel};
use crate::models::Message;
use crate::prompts;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const EMPTY_PORTFOLIO_MESSAGE: &str = "Add your portfolio listings to chat";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NetMargin {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub v: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListingMetrics {
    #[serde(rename = "10DayAverageTradingVolume", default)]
    pub ten_day_average_trading_volume: f64,
    #[serde(rename = "52WeekHigh", default)]
    pub week_52_high: f64,
    #[serde(rename = "52WeekLow", default)]
    pub week_52_low: f64,
    #[serde(rename = "52WeekLowDate", default)]
    pub week_52_low_date: String,
    #[serde(rename = "52WeekPriceReturnDaily", default)]
    pub week_52_price_return_daily: f64,
    #[serde(default)]
    pub beta: f64,
    #[serde(rename = "netMargin", default)]
    pub net_margin: NetMargin,
}

/// One holding as sent by the portfolio builder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    pub ticker: String,
    pub name: String,
    pub user_shares: f64,
    pub industry: String,
    pub exchange: String,
    pub currency: String,
    pub logo_url: String,
    pub market_capitalization: f64,
    pub share_outstanding: f64,
    pub metrics: ListingMetrics,
}

impl Listing {
    pub fn current_price(&self) -> f64 {
        if self.share_outstanding > 0.0 {
            self.market_capitalization / self.share_outstanding
        } else {
            0.0
        }
    }

    pub fn position_value(&self) -> f64 {
        self.current_price() * self.user_shares
    }

    /// Beta, 52-week return and liquidity, scored into Low / Medium / High
    pub fn risk_level(&self) -> PositionRisk {
        let mut score = 0;

        let beta = self.metrics.beta;
        if beta > 1.5 {
            score += 3;
        } else if beta > 1.2 {
            score += 2;
        } else if beta > 1.0 {
            score += 1;
        }

        let volatility = self.metrics.week_52_price_return_daily.abs();
        if volatility > 50.0 {
            score += 3;
        } else if volatility > 30.0 {
            score += 2;
        } else if volatility > 15.0 {
            score += 1;
        }

        let volume = self.metrics.ten_day_average_trading_volume;
        if volume < 100_000.0 {
            score += 2;
        } else if volume < 500_000.0 {
            score += 1;
        }

        if score >= 5 {
            PositionRisk::High
        } else if score >= 3 {
            PositionRisk::Medium
        } else {
            PositionRisk::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PositionRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

//
// ================= Summary =================
//

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub ticker: String,
    /// Percent of total portfolio value
    pub allocation: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskiestPosition {
    pub ticker: String,
    pub beta: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub portfolio_beta: f64,
    pub portfolio_volatility: f64,
    pub portfolio_net_margin: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub number_of_holdings: usize,
    pub allocations: Vec<Allocation>,
    pub largest_holding: Option<Allocation>,
    pub riskiest_position: Option<RiskiestPosition>,
    pub portfolio_metrics: PortfolioMetrics,
    /// Percent of total value per industry
    pub sector_allocation: BTreeMap<String, f64>,
    pub risk: RiskSummary,
}

pub fn total_value(listings: &[Listing]) -> f64 {
    listings.iter().map(Listing::position_value).sum()
}

/// Weight of each listing as a fraction of total value (0 when the total is 0)
fn weights(listings: &[Listing]) -> Vec<f64> {
    let total = total_value(listings);
    listings
        .iter()
        .map(|l| {
            if total > 0.0 {
                l.position_value() / total
            } else {
                0.0
            }
        })
        .collect()
}

pub fn allocations(listings: &[Listing]) -> Vec<Allocation> {
    listings
        .iter()
        .zip(weights(listings))
        .map(|(listing, weight)| Allocation {
            ticker: listing.ticker.clone(),
            allocation: weight * 100.0,
        })
        .collect()
}

pub fn risk_metrics(listings: &[Listing]) -> PortfolioMetrics {
    let mut metrics = PortfolioMetrics {
        portfolio_beta: 0.0,
        portfolio_volatility: 0.0,
        portfolio_net_margin: 0.0,
    };

    for (listing, weight) in listings.iter().zip(weights(listings)) {
        metrics.portfolio_beta += listing.metrics.beta * weight;

        let low = listing.metrics.week_52_low;
        if low > 0.0 {
            let range = (listing.metrics.week_52_high - low) / low;
            metrics.portfolio_volatility += range * weight;
        }

        metrics.portfolio_net_margin += listing.metrics.net_margin.v * weight;
    }

    metrics
}

pub fn sector_allocation(listings: &[Listing]) -> BTreeMap<String, f64> {
    let mut sectors: BTreeMap<String, f64> = BTreeMap::new();
    for (listing, weight) in listings.iter().zip(weights(listings)) {
        *sectors.entry(listing.industry.clone()).or_default() += weight * 100.0;
    }
    sectors
}

/// Weighted beta, sector concentration and share of high-risk positions
pub fn risk_summary(listings: &[Listing]) -> RiskSummary {
    let metrics = risk_metrics(listings);
    let sectors = sector_allocation(listings);

    let mut score = 0;
    let mut factors = Vec::new();

    if metrics.portfolio_beta > 1.5 {
        score += 3;
        factors.push("High market sensitivity (β > 1.5)".to_string());
    } else if metrics.portfolio_beta > 1.2 {
        score += 2;
        factors.push("Above-average market sensitivity (β > 1.2)".to_string());
    } else if metrics.portfolio_beta > 1.0 {
        score += 1;
        factors.push("Moderate market sensitivity (β > 1)".to_string());
    }

    let highest_sector = sectors.values().cloned().fold(0.0, f64::max);
    if highest_sector > 50.0 {
        score += 3;
        factors.push("High sector concentration (>50% in one sector)".to_string());
    } else if highest_sector > 30.0 {
        score += 2;
        factors.push("Moderate sector concentration (>30% in one sector)".to_string());
    }

    let high_risk = listings
        .iter()
        .filter(|l| l.risk_level() == PositionRisk::High)
        .count();
    if high_risk as f64 > listings.len() as f64 * 0.3 {
        score += 2;
        factors.push(format!("{} stocks with high risk ratings", high_risk));
    }

    let risk_level = if score >= 6 {
        RiskLevel::High
    } else if score >= 3 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    RiskSummary {
        risk_level,
        risk_score: score,
        risk_factors: factors,
    }
}

pub fn summarize(listings: &[Listing]) -> PortfolioSummary {
    let allocations = allocations(listings);

    let largest_holding = allocations
        .iter()
        .max_by(|a, b| a.allocation.total_cmp(&b.allocation))
        .cloned();

    let riskiest_position = listings
        .iter()
        .max_by(|a, b| a.metrics.beta.total_cmp(&b.metrics.beta))
        .map(|l| RiskiestPosition {
            ticker: l.ticker.clone(),
            beta: l.metrics.beta,
        });

    PortfolioSummary {
        total_value: total_value(listings),
        number_of_holdings: listings.len(),
        largest_holding,
        riskiest_position,
        portfolio_metrics: risk_metrics(listings),
        sector_allocation: sector_allocation(listings),
        risk: risk_summary(listings),
        allocations,
    }
}

//
// ================= Chat =================
//

#[derive(Serialize)]
struct PortfolioContext<'a> {
    #[serde(rename = "Listings")]
    listings: &'a [Listing],
    #[serde(rename = "Portfolio Summary")]
    summary: PortfolioSummary,
}

pub struct PortfolioChat {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl PortfolioChat {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Zero listings short-circuit before any model call.
    pub async fn respond(
        &self,
        listings: &[Listing],
        history: &[Message],
        question: &str,
    ) -> Result<String> {
        if listings.is_empty() {
            info!("Portfolio chat without listings");
            return Ok(EMPTY_PORTFOLIO_MESSAGE.to_string());
        }

        let context = PortfolioContext {
            listings,
            summary: summarize(listings),
        };
        let system = prompts::portfolio_system_prompt(&serde_json::to_string(&context)?);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system));
        messages.extend_from_slice(history);
        messages.push(Message::user(question));

        info!(holdings = listings.len(), "Portfolio chat");

        tokio::time::timeout(
            self.timeout,
            self.model
                .complete_text(&messages, &CompletionOptions::default()),
        )
        .await
        .map_err(|_| {
            warn!(timeout_secs = self.timeout.as_secs(), "Portfolio chat timed out");
            ResearchError::Timeout(format!(
                "portfolio chat exceeded {}s",
                self.timeout.as_secs()
            ))
        })?
    }
}
