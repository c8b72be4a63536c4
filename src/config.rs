//! Environment configuration
//!
//! Binaries call `dotenv::dotenv().ok()` first, then [`Config::from_env`].

use std::env;
use tracing::warn;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Used for free-text answers
    pub model: String,
    /// Used for classification, extraction and continuity checks
    pub analysis_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct FmpConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Listing lookups (company profile and basic financials)
#[derive(Debug, Clone)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Most-recent-N messages handed to answer synthesis
    pub history_window: usize,
    pub portfolio_chat_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub fmp: FmpConfig,
    pub finnhub: FinnhubConfig,
    pub pipeline: PipelineConfig,
    pub port: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            portfolio_chat_timeout_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let timeout_secs = parse_env_or("HTTP_TIMEOUT_SECS", 60u64);
        let model = env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL);

        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        if gemini_api_key.is_empty() {
            warn!("GEMINI_API_KEY not set; model calls will degrade to fallback answers");
        }

        let fmp_api_key = env::var("FMP_API_KEY").unwrap_or_default();
        if fmp_api_key.is_empty() {
            warn!("FMP_API_KEY not set; financial data fetches will fail");
        }

        let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();
        if finnhub_api_key.is_empty() {
            warn!("FINNHUB_API_KEY not set; listing lookups will fail");
        }

        let port = env::var("PORT")
            .or_else(|_| env::var("API_PORT"))
            .ok()
            .and_then(|p| match p.parse() {
                Ok(port) => Some(port),
                Err(e) => {
                    warn!("Invalid port '{}': {}. Using 8080.", p, e);
                    None
                }
            })
            .unwrap_or(8080);

        let defaults = PipelineConfig::default();

        Self {
            gemini: GeminiConfig {
                api_key: gemini_api_key,
                base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
                analysis_model: env_or("GEMINI_ANALYSIS_MODEL", &model),
                model,
                timeout_secs,
            },
            fmp: FmpConfig {
                api_key: fmp_api_key,
                base_url: env_or("FMP_BASE_URL", DEFAULT_FMP_BASE_URL),
                timeout_secs,
            },
            finnhub: FinnhubConfig {
                api_key: finnhub_api_key,
                base_url: env_or("FINNHUB_BASE_URL", DEFAULT_FINNHUB_BASE_URL),
                timeout_secs,
            },
            pipeline: PipelineConfig {
                history_window: parse_env_or("HISTORY_WINDOW", defaults.history_window),
                portfolio_chat_timeout_secs: parse_env_or(
                    "PORTFOLIO_CHAT_TIMEOUT_SECS",
                    defaults.portfolio_chat_timeout_secs,
                ),
            },
            port,
        }
    }
}
