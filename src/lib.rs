//! Earnings Research Assistant
//!
//! A conversational assistant for questions about public companies:
//! - Classifies a question into one or more research intents
//! - Extracts structured parameters (tickers, metrics, time frames) per intent
//! - Fetches statements, profiles and earnings-call transcripts
//! - Writes one answer per intent and joins them in ranking order
//! - Asks a clarifying question when confidence is low
//! - Resolves portfolio listings and chats about the assembled portfolio
//!
//! TURN FLOW:
//! CONTINUITY CHECK → CLASSIFY → (CLARIFY | EXTRACT → FETCH → SYNTHESIZE)

pub mod api;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod listing;
pub mod llm;
pub mod models;
pub mod orchestrator;
pub mod portfolio;
pub mod prompts;
pub mod provider;
pub mod synthesizer;
pub mod vocabulary;

pub use error::{ResearchError, Result};

// Re-export common types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use conversation::{PipelineStage, ResearchAssistant};
pub use llm::{GeminiClient, LanguageModel, ScriptedModel};
pub use models::*;
pub use listing::ListingLookup;
pub use portfolio::{Listing, PortfolioChat};
pub use provider::{
    FinancialDataProvider, FinnhubClient, FmpClient, MarketDataProvider, StaticMarketData,
    StaticProvider,
};
