//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`       - Create a short URL (rate limited)
//! - `POST /shorten/batch` - Create up to 100 short URLs (rate limited)
//! - `GET  /analytics/{code}` - Click stats for a code (rate limited)
//! - `GET  /{code}`        - Redirect (rate limited)
//! - `GET  /health`        - Health check: DB, cache, click queue
//! - `GET  /metrics`       - Prometheus scrape endpoint
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Request metrics** - `http_request_total` by method, route and status
//! - **Rate limiting** - Per-IP sliding window backed by the shared store
//! - **Path normalization** - Trailing slash handling

use crate::api::middleware::{metrics, tracing};
use crate::api::routes::{limited_routes, open_routes};
use crate::state::AppState;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and middleware except path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(limited_routes(state.clone()))
        .merge(open_routes())
        .with_state(state)
        .layer(middleware::from_fn(metrics::track))
        .layer(tracing::layer())
}

/// Constructs the application service: [`router`] wrapped so that
/// `/shorten/` and `/shorten` reach the same handler.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
