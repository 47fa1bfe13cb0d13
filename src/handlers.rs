use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderName;
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::cors::{Any, CorsLayer};

use crate::agents::{available_agents, AgentsListResponse, AnswerResponse, QuestionRequest};
use crate::error::Result;
use crate::init::AppState;
use crate::tracking;
use crate::types::Timestamp;

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/agents", get(available_agents_handler))
        .route("/api/agents/available", get(available_agents_handler))
        .route("/api/agents/answer", post(answer_handler))
        .route("/api/agents/answer-stream", post(answer_stream_handler))
        .merge(tracking::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ============================================================================
// HEALTH
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Timestamp,
    pub agents_loaded: usize,
    pub llm_configured: bool,
    pub model: String,
    pub routing_mode: String,
    pub version: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model = state.pipeline.model_name().to_string();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Timestamp::now(),
        agents_loaded: available_agents().total_agents,
        llm_configured: !model.is_empty(),
        model,
        routing_mode: state.pipeline.routing_mode().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// AGENT ENDPOINTS
// ============================================================================

pub async fn available_agents_handler() -> Json<AgentsListResponse> {
    Json(available_agents())
}

/// POST /api/agents/answer
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>> {
    let Json(request) = payload?;
    request.validate(state.pipeline.limits())?;

    log::info!("📝 Answering: {}", request.question);
    Ok(Json(state.pipeline.answer(&request).await?))
}

/// POST /api/agents/answer-stream
///
/// Validation failures are returned as plain JSON errors before any event is
/// sent. After that every problem is reported in-band as an `error` event.
pub async fn answer_stream_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate(state.pipeline.limits())?;

    log::info!("📡 Streaming answer: {}", request.question);
    let rx = state.pipeline.clone().stream(request);
    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(event));

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    );

    Ok(([(HeaderName::from_static("x-accel-buffering"), "no")], sse))
}
