//! Error types for the earnings research assistant

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ResearchError>;

#[derive(Error, Debug)]
pub enum ResearchError {

    // =============================
    // Language Model Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    // =============================
    // Financial Data Errors
    // =============================

    #[error("Provider returned {status} for {endpoint}: {detail}")]
    ProviderError {
        status: u16,
        endpoint: String,
        detail: String,
    },

    #[error("No data returned from provider for {0}")]
    EmptyResponse(String),

    #[error("Ticker required: {0}")]
    TickerRequired(String),

    #[error("Cannot fetch data for query with error: {0}")]
    InvalidQuery(String),

    // =============================
    // Boundary Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
