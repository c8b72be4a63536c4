//! One-shot CLI: `ask "How did Apple's revenue do last quarter?"`

use earnings_research_assistant::{
    ChatResponse, Config, FmpClient, GeminiClient, ResearchAssistant, ResearchError, SystemClock,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so the answer alone lands on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        return Err(ResearchError::InvalidRequest("usage: ask \"<question>\"".to_string()).into());
    }

    let config = Config::from_env();
    let assistant = ResearchAssistant::new(
        Arc::new(GeminiClient::new(&config.gemini)?),
        Arc::new(FmpClient::new(&config.fmp)?),
        Arc::new(SystemClock),
        config.pipeline.history_window,
    );

    info!(question = %question, "Running single turn");

    match assistant.handle_user_query(&[], &question).await {
        ChatResponse::ClarificationNeeded { message } => {
            println!("Need more detail: {}", message);
        }
        response => println!("{}", response.message()),
    }

    Ok(())
}
