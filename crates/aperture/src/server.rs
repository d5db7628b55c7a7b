//! HTTP transport for the bridge.
//!
//! A deliberately thin layer: parse inbound JSON into the core's request
//! types, call the dispatcher or batch orchestrator, and map the core's
//! error kinds to HTTP statuses. No request semantics live here.

use aperture_core::{
    AnalyzeRequest, BatchOptions, BatchOrchestrator, BridgeConfig, BridgeError, ChatRequest,
    Dispatcher, ErrorKind, ProviderResponse,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared handler state: the immutable config snapshot plus the two core
/// entry points built from it.
#[derive(Clone)]
pub struct AppState {
    config: Arc<BridgeConfig>,
    dispatcher: Dispatcher,
    batch: BatchOrchestrator,
}

impl AppState {
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        let dispatcher = Dispatcher::new(config.clone());
        let batch = BatchOrchestrator::new(dispatcher.clone(), BatchOptions::default());
        Self {
            config,
            dispatcher,
            batch,
        }
    }
}

/// Transport-level error wrapper, turned into a JSON error response.
enum ApiError {
    Bridge(BridgeError),
    BadRequest(String),
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        ApiError::Bridge(error)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidImageReference
        | ErrorKind::ImageReadError
        | ErrorKind::UnknownProvider => StatusCode::BAD_REQUEST,
        ErrorKind::BackendUnreachable | ErrorKind::BackendProtocolError => StatusCode::BAD_GATEWAY,
        ErrorKind::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Bridge(error) => {
                tracing::error!("Request failed: {error}");
                (status_for(error.kind()), error.kind().as_str(), error.to_string())
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "invalid_request", message)
            }
        };
        let body = Json(json!({"error": {"kind": kind, "message": message}}));
        (status, body).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(show_config))
        .route("/chat", post(chat))
        .route("/analyze", post(analyze))
        .route("/batch", post(batch))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn show_config(State(state): State<AppState>) -> Json<Value> {
    Json(state.config.redacted())
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ProviderResponse>, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest(
            "'messages' must be a non-empty list".to_string(),
        ));
    }
    let response = state.dispatcher.dispatch_chat(&request).await?;
    Ok(Json(response))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ProviderResponse>, ApiError> {
    if request.images.is_empty() {
        return Err(ApiError::BadRequest(
            "'images' must be a non-empty list".to_string(),
        ));
    }
    let response = state.dispatcher.dispatch_analyze(&request).await?;
    Ok(Json(response))
}

async fn batch(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.images.is_empty() {
        return Err(ApiError::BadRequest(
            "'images' must be a non-empty list".to_string(),
        ));
    }
    let results = state.batch.run(&request).await?;
    Ok(Json(json!({"results": results})))
}

/// Bind and serve until a shutdown signal arrives.
pub async fn serve(config: BridgeConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(Arc::new(config));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
