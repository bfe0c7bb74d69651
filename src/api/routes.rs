//! Route configuration.

use crate::api::handlers::{
    analytics_handler, health_handler, metrics_handler, redirect_handler, shorten_batch_handler,
    shorten_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Rate-limited public routes.
///
/// # Endpoints
///
/// - `POST /shorten`       - Create a short URL
/// - `POST /shorten/batch` - Create up to 100 short URLs
/// - `GET  /analytics/{code}` - Click stats and recent clicks for a code
/// - `GET  /{code}`        - Redirect to the original URL
pub fn limited_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route("/analytics/{code}", get(analytics_handler))
        .route("/{code}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer))
}

/// Routes exempt from rate limiting.
///
/// - `GET /health`  - Component health checks
/// - `GET /metrics` - Prometheus exposition
pub fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}
