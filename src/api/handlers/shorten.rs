//! Handlers for the shortening endpoints.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use validator::Validate;

use crate::api::dto::shorten::{
    BatchResultItem, BatchSummary, ShortenBatchRequest, ShortenBatchResponse, ShortenUrlRequest,
    ShortenUrlResponse,
};
use crate::application::services::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "expires_in": 3600,   // optional, seconds
///   "alias": "my-link"    // optional
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "my-link",
///   "short_url": "https://sho.rt/my-link",
///   "expires_at": "2025-01-01T01:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 on malformed body, invalid URL or alias
/// - 409 when the alias is taken
/// - 503 when no free code could be generated
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenUrlRequest>, JsonRejection>,
) -> Result<Json<ShortenUrlResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let shortened = state.shortener.shorten(payload.into()).await?;

    Ok(Json(shortened.into()))
}

/// Creates short URLs for up to 100 items.
///
/// # Endpoint
///
/// `POST /shorten/batch`
///
/// # Batch Processing
///
/// Items are processed independently. If one fails, the others continue;
/// each result carries either the short URL or an error object.
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total": 2, "successful": 1, "failed": 1 },
///   "results": [
///     { "url": "https://a.com", "short_code": "Ab3dE9xQ", "short_url": "...", "expires_at": null },
///     { "url": "ftp://b.com", "error": { "code": "validation_error", "message": "...", "details": {} } }
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request only for a malformed body or an item count
/// outside 1-100.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenBatchRequest>, JsonRejection>,
) -> Result<Json<ShortenBatchResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let total = payload.items.len();
    let mut outcomes: Vec<Option<BatchResultItem>> = Vec::with_capacity(total);
    let mut accepted: Vec<(usize, ShortenRequest)> = Vec::new();

    for (index, item) in payload.items.into_iter().enumerate() {
        match item.validate() {
            Ok(()) => {
                accepted.push((index, item.into()));
                outcomes.push(None);
            }
            Err(errors) => outcomes.push(Some(BatchResultItem::Error {
                url: item.url,
                error: AppError::from(errors).to_error_info(),
            })),
        }
    }

    if !accepted.is_empty() {
        let (indices, requests): (Vec<usize>, Vec<ShortenRequest>) = accepted.into_iter().unzip();
        let results = state.shortener.shorten_batch(requests).await?;

        for (index, result) in indices.into_iter().zip(results) {
            outcomes[index] = Some(match result.outcome {
                Ok(shortened) => BatchResultItem::Success {
                    url: result.url,
                    short_code: shortened.short_code,
                    short_url: shortened.short_url,
                    expires_at: shortened.expires_at,
                },
                Err(err) => BatchResultItem::Error {
                    url: result.url,
                    error: err.to_error_info(),
                },
            });
        }
    }

    let results: Vec<BatchResultItem> = outcomes.into_iter().flatten().collect();
    let successful = results
        .iter()
        .filter(|r| matches!(r, BatchResultItem::Success { .. }))
        .count();

    Ok(Json(ShortenBatchResponse {
        summary: BatchSummary {
            total,
            successful,
            failed: total - successful,
        },
        results,
    }))
}
