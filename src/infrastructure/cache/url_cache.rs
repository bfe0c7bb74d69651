//! URL-specific cache-aside helpers.

use super::service::{CacheResult, KeyValueStore};
use crate::infrastructure::metrics::URL_CACHE_REQUESTS_TOTAL;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Namespace prefix of cached URL mappings.
pub const URL_KEY_PREFIX: &str = "url:";

/// TTL for mappings without an expiration (one year).
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Computes the cache TTL for a mapping.
///
/// Returns the remaining lifetime when the URL expires, the one-year default
/// when it does not, and `None` when the URL is already expired (or has less
/// than a millisecond left), in which case the mapping must not be cached.
pub fn url_ttl(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    match expires_at {
        None => Some(DEFAULT_URL_TTL),
        Some(expires_at) => (expires_at - now)
            .to_std()
            .ok()
            .filter(|ttl| ttl.as_millis() > 0),
    }
}

/// Cache-aside view over a [`KeyValueStore`] keyed by short code.
///
/// The durable store is authoritative, so the cache is only an accelerator:
/// read errors degrade to a miss and [`UrlCache::populate`] swallows write
/// errors. Misses are never cached.
#[derive(Clone)]
pub struct UrlCache {
    store: Arc<dyn KeyValueStore>,
}

impl UrlCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Builds the namespaced key for a short code.
    pub fn key(short_code: &str) -> String {
        format!("{}{}", URL_KEY_PREFIX, short_code)
    }

    /// Looks up the cached URL for a short code.
    ///
    /// Backend errors are logged and reported as a miss.
    pub async fn get_url(&self, short_code: &str) -> Option<String> {
        match self.store.get(&Self::key(short_code)).await {
            Ok(Some(url)) => {
                debug!("Cache HIT: {}", short_code);
                metrics::counter!(URL_CACHE_REQUESTS_TOTAL, "result" => "hit").increment(1);
                Some(url)
            }
            Ok(None) => {
                debug!("Cache MISS: {}", short_code);
                metrics::counter!(URL_CACHE_REQUESTS_TOTAL, "result" => "miss").increment(1);
                None
            }
            Err(e) => {
                warn!("Cache read failed for {}, treating as miss: {}", short_code, e);
                metrics::counter!(URL_CACHE_REQUESTS_TOTAL, "result" => "error").increment(1);
                None
            }
        }
    }

    /// Stores a mapping with an explicit TTL, reporting failures.
    pub async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        self.store
            .set(&Self::key(short_code), original_url, ttl)
            .await
    }

    /// Removes a cached mapping.
    pub async fn delete_url(&self, short_code: &str) -> CacheResult<()> {
        self.store.delete(&Self::key(short_code)).await
    }

    /// Best-effort cache write following the URL TTL policy.
    ///
    /// This is the only place where cache write failures are suppressed.
    /// Returns `true` when the mapping was written, `false` when it was skipped
    /// (already expired) or the write failed.
    pub async fn populate(
        &self,
        short_code: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(ttl) = url_ttl(expires_at, now) else {
            debug!("Skipping cache for {}: already expired", short_code);
            return false;
        };

        match self.set_url(short_code, original_url, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache write failed for {} (ignored): {}", short_code, e);
                false
            }
        }
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}
