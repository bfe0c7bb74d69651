//! Handler for the Prometheus scrape endpoint.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Renders every recorded metric in the Prometheus text format.
///
/// # Endpoint
///
/// `GET /metrics` (not rate limited)
///
/// # Errors
///
/// Returns 404 Not Found when the process runs without a recorder.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let handle = state.metrics.as_ref().ok_or_else(|| {
        AppError::not_found("Metrics recorder is not installed", json!({}))
    })?;

    Ok((
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        handle.render(),
    )
        .into_response())
}
