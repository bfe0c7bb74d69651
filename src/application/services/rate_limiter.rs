//! Sliding-window rate limiter backed by a [`KeyValueStore`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use tracing::debug;

use crate::infrastructure::cache::{CacheError, KeyValueStore};

/// Namespace prefix of rate-limit windows.
pub const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit:";

/// Extra lifetime of a stored window beyond the window size.
pub const WINDOW_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit store error: {0}")]
    Store(#[from] CacheError),

    #[error("stored rate limit window is not a timestamp list: {0}")]
    CorruptWindow(#[source] serde_json::Error),

    #[error("failed to encode rate limit window: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Per-identifier sliding window of admitted request timestamps.
///
/// Each identity owns one stored JSON list of RFC 3339 timestamps. A request
/// is admitted when fewer than `max_requests` entries fall strictly after
/// `now - window`. The read-modify-write is not atomic: concurrent calls for
/// the same identity may over-admit. No state is kept in process.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, max_requests: usize, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn key(identifier: &str) -> String {
        format!("{}{}", RATE_LIMIT_KEY_PREFIX, identifier)
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admits or rejects a request for `identifier` at the current time.
    ///
    /// # Errors
    ///
    /// Propagates store failures and undecodable stored windows. Callers must
    /// not turn an error into an admit or a reject.
    pub async fn allow(&self, identifier: &str) -> Result<bool, RateLimitError> {
        self.allow_at(identifier, Utc::now()).await
    }

    /// Same as [`RateLimiter::allow`] with an explicit clock reading.
    pub async fn allow_at(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RateLimitError> {
        let key = Self::key(identifier);

        let stored: Vec<String> = match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(RateLimitError::CorruptWindow)?,
            None => Vec::new(),
        };

        let cutoff = TimeDelta::from_std(self.window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut live: Vec<String> = stored
            .into_iter()
            .filter(|ts| {
                DateTime::parse_from_rfc3339(ts)
                    .is_ok_and(|t| t.with_timezone(&Utc) > cutoff)
            })
            .collect();

        if live.len() >= self.max_requests {
            debug!(
                "Rate limit reached for {} ({} in window)",
                identifier,
                live.len()
            );
            return Ok(false);
        }

        live.push(now.to_rfc3339_opts(SecondsFormat::Millis, true));
        let encoded = serde_json::to_string(&live).map_err(RateLimitError::Encode)?;

        self.store
            .set(&key, &encoded, self.window.saturating_add(WINDOW_GRACE))
            .await?;

        Ok(true)
    }
}
