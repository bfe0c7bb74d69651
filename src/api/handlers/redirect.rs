//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;

use crate::domain::click_event::ClickInfo;
use crate::error::AppError;
use crate::infrastructure::metrics::REDIRECT_REQUESTS_TOTAL;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Existence filter says "never issued" → 404 without any I/O
/// 2. Cache hit → redirect
/// 3. Cache miss → durable store, expiration check, cache repopulation
/// 4. Click event queued for the background worker (dropped if the queue is full)
/// 5. 307 Temporary Redirect
///
/// # Errors
///
/// - 404 Not Found if the code was never issued
/// - 410 Gone if the mapping has expired
/// - 500 on store failures
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let click = ClickInfo::new(
        client_ip(&headers, Some(addr), state.behind_proxy),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    match state.shortener.get_original_url(&code, Some(click)).await {
        Ok(url) => {
            metrics::counter!(REDIRECT_REQUESTS_TOTAL, "outcome" => "redirected").increment(1);
            Ok(Redirect::temporary(&url))
        }
        Err(err) => {
            let outcome = match err {
                AppError::NotFound { .. } => "not_found",
                AppError::Gone { .. } => "expired",
                _ => "error",
            };
            metrics::counter!(REDIRECT_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
            Err(err)
        }
    }
}
