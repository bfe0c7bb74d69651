//! Handler for per-code click analytics.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::analytics::{AnalyticsQuery, AnalyticsResponse};
use crate::application::services::analytics_service::resolve_limit;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click totals and the newest click records for a short code.
///
/// # Endpoint
///
/// `GET /analytics/{code}?limit=N`
///
/// `limit` accepts 1-1000; any other value falls back to 100. A code without
/// recorded clicks, issued or not, answers with zeroed stats.
///
/// # Response
///
/// ```json
/// {
///   "short_code": "abc123",
///   "total_clicks": 2,
///   "unique_ips": 1,
///   "last_click": "2024-01-01T12:00:00Z",
///   "records": [
///     { "id": 2, "ip": "10.0.0.1", "user_agent": "curl/8.0", "referer": null, "clicked_at": "2024-01-01T12:00:00Z" }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - 500 on database errors
pub async fn analytics_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let limit = resolve_limit(query.limit.as_deref());
    let analytics = state.analytics.get_analytics(&code, limit).await?;

    Ok(Json(analytics.into()))
}
