//! HTTP API server for Herald gateway

pub mod execute;
pub mod health;
pub mod voice;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pipeline::VoicePipeline;
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// The voice processing pipeline
    pub pipeline: VoicePipeline,
}

/// Build the gateway router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    // Allow-all CORS: the browser recorder front end runs on its own origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .merge(voice::router(Arc::clone(&state)))
        .merge(execute::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until the process is interrupted
///
/// # Errors
///
/// Returns error if the listener cannot bind or the server faults
pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "api server listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
