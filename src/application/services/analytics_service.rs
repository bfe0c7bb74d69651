//! Click analytics read path.

use std::sync::Arc;

use crate::domain::entities::{Click, ClickStats};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Number of click records returned when no usable limit is given.
pub const DEFAULT_ANALYTICS_LIMIT: i64 = 100;

/// Upper bound of the `limit` query parameter.
pub const MAX_ANALYTICS_LIMIT: i64 = 1_000;

/// Aggregates and latest records for one short code.
#[derive(Debug, Clone)]
pub struct CodeAnalytics {
    pub short_code: String,
    pub stats: ClickStats,
    pub records: Vec<Click>,
}

/// Resolves the raw `limit` query parameter.
///
/// Anything that is not an integer in `1..=1000` falls back to
/// [`DEFAULT_ANALYTICS_LIMIT`] instead of failing the request.
pub fn resolve_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| (1..=MAX_ANALYTICS_LIMIT).contains(limit))
        .unwrap_or(DEFAULT_ANALYTICS_LIMIT)
}

/// Service for reading recorded clicks.
///
/// Reads are not gated on the code existing: a code that was never issued, or
/// whose clicks have not been written yet, reports zero clicks.
#[derive(Clone)]
pub struct AnalyticsService {
    repository: Arc<dyn ClickRepository>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn ClickRepository>) -> Self {
        Self { repository }
    }

    /// Returns click stats and up to `limit` of the newest records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_analytics(
        &self,
        short_code: &str,
        limit: i64,
    ) -> Result<CodeAnalytics, AppError> {
        let stats = self.repository.stats(short_code).await?;
        let records = self.repository.recent(short_code, limit).await?;

        Ok(CodeAnalytics {
            short_code: short_code.to_string(),
            stats,
            records,
        })
    }
}
