use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::StreamExt;
use geniesite_client::{GENERATE_ROUTE, LEGACY_GENERATE_ROUTE};
use geniesite_model::PartSource;
use geniesite_protocol::{encode_event, GenerationRequest};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::relay::relay_events;

const PROMPT_REQUIRED: &str = "Prompt is required";

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PartSource>,
    pub relay: RelayConfig,
    pub port: u16,
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(GENERATE_ROUTE, post(generate))
        .route(LEGACY_GENERATE_ROUTE, post(generate_legacy))
        .route("/health", get(health))
        .route("/", get(root))
        .with_state(state)
}

/// POST /api/generate - Stream a generation as server-sent events
async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let prompt = request
        .validated_prompt()
        .ok_or_else(|| AppError::BadRequest(PROMPT_REQUIRED.to_string()))?
        .to_string();

    let frames = relay_events(state.source.clone(), prompt, state.relay.clone())
        .map(|event| Ok::<_, Infallible>(encode_event(&event)));

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

/// POST /api/generate-website - Legacy alias of /api/generate
async fn generate_legacy(
    state: State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    log::warn!("⚠️  Legacy endpoint called, handling as {}", GENERATE_ROUTE);
    generate(state, payload).await
}

/// GET /health - Liveness check
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "Server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "port": state.port,
    }))
}

/// GET / - Server information
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "GenieSite API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": format!("POST {}", GENERATE_ROUTE),
            "health": "GET /health",
        },
    }))
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    InvalidBody(JsonRejection),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
        };
        log::warn!("Rejected generation request: {}", message);

        let body = Json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
