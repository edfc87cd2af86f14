//! Text command execution and direct questions
//!
//! `/api/execute` bypasses transcription: the front end sends already
//! recognized text, the parser classifies it, and the launcher carries
//! it out. `/ask` forwards a text question straight to the gateway.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::pipeline::ExecOutcome;

/// Build execute router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/execute", post(execute))
        .route("/ask", post(ask))
        .with_state(state)
}

/// Command execution request
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub text: String,
}

/// Command execution response
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub status: &'static str,
    pub message: String,
    pub ok: bool,
}

/// Parse and carry out a text command
async fn execute(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ExecuteRequest>,
) -> Response {
    let text = request.text.trim();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ExecuteResponse {
                status: "error",
                message: "Missing 'text' field".to_string(),
                ok: false,
            }),
        )
            .into_response();
    }

    tracing::info!(%text, "executing command");

    match state.pipeline.execute(text) {
        ExecOutcome::Launched { message } => (
            StatusCode::OK,
            Json(ExecuteResponse {
                status: "success",
                message,
                ok: true,
            }),
        )
            .into_response(),
        ExecOutcome::Failed { message } => (
            StatusCode::NOT_FOUND,
            Json(ExecuteResponse {
                status: "error",
                message,
                ok: false,
            }),
        )
            .into_response(),
        ExecOutcome::Unrecognized { text } => (
            StatusCode::OK,
            Json(ExecuteResponse {
                status: "info",
                message: format!(
                    "Command '{text}' not recognized as an app or website command"
                ),
                ok: false,
            }),
        )
            .into_response(),
    }
}

/// Direct question request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

/// Direct question response
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}

/// Gateway failure response
#[derive(Debug, Serialize)]
pub struct AskErrorResponse {
    pub error: &'static str,
    pub details: String,
}

/// Forward a text question to the gateway
async fn ask(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AskRequest>,
) -> Response {
    let message = request.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AskErrorResponse {
                error: "Empty message",
                details: "the 'message' field must not be blank".to_string(),
            }),
        )
            .into_response();
    }

    let answer = state.pipeline.ask(message).await;
    if answer.ok {
        (StatusCode::OK, Json(AskResponse { response: answer.text })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(AskErrorResponse {
                error: "AI service unavailable",
                details: answer.text,
            }),
        )
            .into_response()
    }
}
