//! REST API Server for the research assistant
//!
//! Exposes the conversation pipeline, listing lookup and the portfolio chat
//! over HTTP.
//! Chat state lives with the client; every request carries its history.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::conversation::ResearchAssistant;
use crate::error::ResearchError;
use crate::listing::ListingLookup;
use crate::models::{ChatResponse, Message};
use crate::portfolio::{Listing, PortfolioChat};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    pub new_message: String,
    #[serde(default)]
    pub is_clarification: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    pub new_message: String,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
pub struct ListingRequest {
    pub ticker: Option<String>,
    pub shares: Option<f64>,
}

/// =============================
/// Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChatReply {
    #[serde(rename_all = "camelCase")]
    Clarification {
        success: bool,
        needs_clarification: bool,
        question: String,
    },
    #[serde(rename_all = "camelCase")]
    Answer {
        success: bool,
        answer: String,
        needs_clarification: bool,
    },
}

impl From<ChatResponse> for ChatReply {
    fn from(response: ChatResponse) -> Self {
        match response {
            ChatResponse::ClarificationNeeded { message } => ChatReply::Clarification {
                success: true,
                needs_clarification: true,
                question: message,
            },
            ChatResponse::DirectResponse { message } | ChatResponse::Answer { message } => {
                ChatReply::Answer {
                    success: true,
                    answer: message,
                    needs_clarification: false,
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PortfolioReply {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListingReply {
    pub success: bool,
    pub data: Listing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Client,
    Server,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn client(message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: ErrorKind::Client,
            message: message.into(),
        }
    }

    pub fn server() -> Self {
        Self {
            success: false,
            kind: ErrorKind::Server,
            message: "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::Client => StatusCode::BAD_REQUEST,
            ErrorKind::Server => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

const INVALID_BODY: &str = "Invalid request body";

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<ResearchAssistant>,
    pub portfolio: Arc<PortfolioChat>,
    pub listings: Arc<ListingLookup>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected chat request: {}", rejection.body_text());
        ApiError::client(INVALID_BODY)
    })?;

    if req.new_message.trim().is_empty() {
        return Err(ApiError::client(INVALID_BODY));
    }

    info!(
        history = req.messages.len(),
        clarification = req.is_clarification,
        "Chat request"
    );

    let response = if req.is_clarification {
        state
            .assistant
            .handle_clarification(&req.messages, &req.new_message)
            .await
    } else {
        state
            .assistant
            .handle_user_query(&req.messages, &req.new_message)
            .await
    };

    Ok(Json(response.into()))
}

/// =============================
/// Portfolio Chat Endpoint
/// =============================

async fn portfolio_chat_handler(
    State(state): State<ApiState>,
    payload: Result<Json<PortfolioChatRequest>, JsonRejection>,
) -> Result<Json<PortfolioReply>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected portfolio chat request: {}", rejection.body_text());
        ApiError::client(INVALID_BODY)
    })?;

    if req.new_message.trim().is_empty() {
        return Err(ApiError::client(INVALID_BODY));
    }

    match state
        .portfolio
        .respond(&req.listings, &req.messages, &req.new_message)
        .await
    {
        Ok(message) => Ok(Json(PortfolioReply {
            success: true,
            message,
        })),
        Err(e) => {
            error!("Portfolio chat failed: {}", e);
            Err(ApiError::server())
        }
    }
}

/// =============================
/// Listing Endpoint
/// =============================

async fn listing_handler(
    State(state): State<ApiState>,
    payload: Result<Json<ListingRequest>, JsonRejection>,
) -> Result<Json<ListingReply>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected listing request: {}", rejection.body_text());
        ApiError::client(INVALID_BODY)
    })?;

    match state
        .listings
        .lookup(req.ticker.as_deref(), req.shares)
        .await
    {
        Ok(listing) => Ok(Json(ListingReply {
            success: true,
            data: listing,
        })),
        Err(ResearchError::InvalidRequest(message)) => Err(ApiError::client(message)),
        Err(e) => {
            error!("Listing lookup failed: {}", e);
            Err(ApiError::server())
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/portfolio-chat", post(portfolio_chat_handler))
        .route("/api/listing", post(listing_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(state: ApiState, port: u16) -> crate::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::llm::ScriptedModel;
    use crate::portfolio::EMPTY_PORTFOLIO_MESSAGE;
    use crate::prompts;
    use crate::listing::{INVALID_TICKER, MISSING_PROPERTIES};
    use crate::provider::{StaticMarketData, StaticProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn router(model: ScriptedModel) -> Router {
        let model = Arc::new(model);
        let assistant = ResearchAssistant::new(
            model.clone(),
            Arc::new(StaticProvider::new()),
            Arc::new(FixedClock::ymd(2024, 5, 17)),
            10,
        );
        create_router(ApiState {
            assistant: Arc::new(assistant),
            portfolio: Arc::new(PortfolioChat::new(model, Duration::from_secs(5))),
            listings: Arc::new(ListingLookup::new(Arc::new(market_data()))),
        })
    }

    fn market_data() -> StaticMarketData {
        StaticMarketData::new().with_company(
            "MSFT",
            json!({
                "ticker": "MSFT",
                "name": "Microsoft Corp",
                "finnhubIndustry": "Technology",
                "marketCapitalization": 3100000.0,
                "shareOutstanding": 7430.0
            }),
            json!({ "metric": { "beta": 0.9, "52WeekHigh": 430.8 } }),
        )
    }

    async fn post_json(router: Router, uri: &str, body: String) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(ScriptedModel::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_clarification_shape() {
        let model = ScriptedModel::new().with_structured(
            prompts::CLASSIFICATION_SCHEMA,
            json!({
                "queryTypes": ["TRANSCRIPT_SUMMARY"],
                "confidenceScore": 0.2,
                "clarifyQuestion": "Which company?"
            }),
        );

        let (status, body) = post_json(
            router(model),
            "/api/chat",
            json!({ "messages": [], "newMessage": "Summarize the call" }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "needsClarification": true, "question": "Which company?" })
        );
    }

    #[tokio::test]
    async fn test_chat_direct_answer_shape() {
        let model = ScriptedModel::new().with_structured(
            prompts::CONTINUITY_SCHEMA,
            json!({ "isContinuation": true, "response": "Yes, that was Q4." }),
        );
        let body = json!({
            "messages": [
                { "role": "user", "content": "Apple Q4 revenue?" },
                { "role": "assistant", "content": "$119.6B in Q4 2023." }
            ],
            "newMessage": "Was that Q4?"
        });

        let (status, body) = post_json(router(model), "/api/chat", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "answer": "Yes, that was Q4.", "needsClarification": false })
        );
    }

    #[tokio::test]
    async fn test_invalid_bodies_are_client_errors() {
        let expected = json!({ "success": false, "type": "client", "message": "Invalid request body" });

        let (status, body) =
            post_json(router(ScriptedModel::new()), "/api/chat", "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, expected);

        let (status, body) = post_json(
            router(ScriptedModel::new()),
            "/api/chat",
            json!({ "messages": [], "newMessage": "  " }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_portfolio_chat_without_listings() {
        let (status, body) = post_json(
            router(ScriptedModel::new()),
            "/api/portfolio-chat",
            json!({ "messages": [], "newMessage": "How risky am I?", "listings": [] }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "message": EMPTY_PORTFOLIO_MESSAGE }));
    }

    #[tokio::test]
    async fn test_portfolio_chat_failure_is_server_error() {
        let model = ScriptedModel::new().with_text_failure("upstream down");
        let body = json!({
            "messages": [],
            "newMessage": "How risky am I?",
            "listings": [{ "ticker": "AAPL", "name": "Apple Inc.", "userShares": 10 }]
        });

        let (status, body) = post_json(router(model), "/api/portfolio-chat", body.to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "type": "server", "message": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn test_listing_lookup() {
        let (status, body) = post_json(
            router(ScriptedModel::new()),
            "/api/listing",
            json!({ "ticker": "MSFT", "shares": 4 }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["ticker"], "MSFT");
        assert_eq!(body["data"]["userShares"], json!(4.0));
        assert_eq!(body["data"]["metrics"]["beta"], json!(0.9));
        assert_eq!(body["data"]["metrics"]["52WeekHigh"], json!(430.8));
    }

    #[tokio::test]
    async fn test_listing_client_errors() {
        let (status, body) = post_json(
            router(ScriptedModel::new()),
            "/api/listing",
            json!({ "ticker": "MSFT" }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "type": "client", "message": MISSING_PROPERTIES })
        );

        let (status, body) = post_json(
            router(ScriptedModel::new()),
            "/api/listing",
            json!({ "ticker": "NOPE", "shares": 1 }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], INVALID_TICKER);
    }
}
