use earnings_research_assistant::{
    api::{start_server, ApiState},
    Config, FinnhubClient, FmpClient, GeminiClient, ListingLookup, PortfolioChat,
    ResearchAssistant, SystemClock,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    info!("Earnings Research Assistant - API Server");
    info!("Port: {}", config.port);

    let model = Arc::new(GeminiClient::new(&config.gemini)?);
    let provider = Arc::new(FmpClient::new(&config.fmp)?);
    let market_data = Arc::new(FinnhubClient::new(&config.finnhub)?);

    let assistant = ResearchAssistant::new(
        model.clone(),
        provider,
        Arc::new(SystemClock),
        config.pipeline.history_window,
    );
    let portfolio = PortfolioChat::new(
        model,
        Duration::from_secs(config.pipeline.portfolio_chat_timeout_secs),
    );

    info!(
        model = %config.gemini.model,
        analysis_model = %config.gemini.analysis_model,
        history_window = config.pipeline.history_window,
        "Assistant initialized"
    );

    let state = ApiState {
        assistant: Arc::new(assistant),
        portfolio: Arc::new(portfolio),
        listings: Arc::new(ListingLookup::new(market_data)),
    };

    start_server(state, config.port).await?;

    Ok(())
}
