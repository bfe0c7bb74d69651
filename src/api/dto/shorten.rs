//! DTOs for the shortening endpoints.

use crate::application::services::{ShortenRequest, ShortenedUrl};
use crate::error::ErrorInfo;
use crate::utils::code_generator::ALIAS_REGEX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Treats `"alias": ""` like an absent alias.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Request to shorten a single URL.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShortenUrlRequest {
    /// The original URL; scheme checks happen in the service.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Lifetime in seconds. After it elapses the code resolves to 410 Gone.
    #[validate(range(min = 1, message = "expires_in must be at least 1 second"))]
    pub expires_in: Option<i64>,

    /// Custom short code. An empty string means "generate one".
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 64))]
    #[validate(regex(path = "*ALIAS_REGEX", message = "Alias can only contain letters, digits, underscores and hyphens"))]
    pub alias: Option<String>,
}

impl From<ShortenUrlRequest> for ShortenRequest {
    fn from(dto: ShortenUrlRequest) -> Self {
        Self {
            url: dto.url,
            expires_in: dto.expires_in,
            alias: dto.alias,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShortenUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ShortenedUrl> for ShortenUrlResponse {
    fn from(shortened: ShortenedUrl) -> Self {
        Self {
            short_code: shortened.short_code,
            short_url: shortened.short_url,
            expires_at: shortened.expires_at,
        }
    }
}

/// Request to shorten several URLs at once.
///
/// Items are validated individually; an invalid item becomes an error entry in
/// the response instead of failing the batch.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenBatchRequest {
    #[validate(length(min = 1, max = 100, message = "Batch must contain 1-100 items"))]
    pub items: Vec<ShortenUrlRequest>,
}

#[derive(Debug, Serialize)]
pub struct ShortenBatchResponse {
    pub summary: BatchSummary,
    pub results: Vec<BatchResultItem>,
}

/// Individual result for a URL in the batch.
///
/// Uses untagged enum for cleaner JSON structure (no discriminator field).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchResultItem {
    Success {
        url: String,
        short_code: String,
        short_url: String,
        expires_at: Option<DateTime<Utc>>,
    },
    Error {
        url: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
