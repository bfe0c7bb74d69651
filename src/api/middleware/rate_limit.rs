//! Sliding-window admission middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{error, warn};

use crate::error::AppError;
use crate::infrastructure::metrics::RATE_LIMIT_BLOCKED_TOTAL;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Identity used when neither headers nor the socket reveal the client.
const UNKNOWN_CLIENT: &str = "unknown";

/// Admits or rejects a request using [`crate::application::services::RateLimiter`].
///
/// # Key Extraction
///
/// Requests are keyed by client IP: the socket peer address, or the first
/// `X-Forwarded-For` / `X-Real-IP` value when the service runs behind a
/// trusted proxy.
///
/// # Responses
///
/// - `429 Too Many Requests` when the window is full
/// - `500 Internal Server Error` when the limiter's store fails; the request
///   is neither admitted nor counted as rejected
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identifier = client_ip(request.headers(), peer, state.behind_proxy)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    match state.rate_limiter.allow(&identifier).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            metrics::counter!(RATE_LIMIT_BLOCKED_TOTAL).increment(1);
            warn!("Rate limit exceeded for {}", identifier);
            AppError::too_many_requests(
                "Rate limit exceeded",
                json!({
                    "limit": state.rate_limiter.max_requests(),
                    "window_seconds": state.rate_limiter.window().as_secs(),
                }),
            )
            .into_response()
        }
        Err(e) => {
            error!("Rate limit check failed for {}: {}", identifier, e);
            AppError::internal("rate limit check failed", json!({})).into_response()
        }
    }
}
