//! HTTP endpoints.
//!
//! - `/`        : greeting
//! - `/health`  : liveness stub, checks nothing
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app_state::AppState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument(skip_all, name = "reqmeter.ops.root")]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello World!",
    })
}

#[tracing::instrument(skip_all, name = "reqmeter.ops.health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Render the registry. Export failures become a 500 carrying the error text.
#[tracing::instrument(skip_all, name = "reqmeter.ops.metrics")]
pub async fn metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let registry = state.registry();
    let body = registry.export().map_err(|e| {
        tracing::error!(code = e.code(), error = %e, "metrics export failed");
        AppError::from(e)
    })?;

    Ok(([(header::CONTENT_TYPE, registry.content_type())], body).into_response())
}
