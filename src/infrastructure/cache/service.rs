//! Key-value store trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache TTL must be positive, got {0:?}")]
    InvalidTtl(Duration),
}

/// Result type for key-value store operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// A shared key-value store with per-key expiry.
///
/// Backs both the URL cache and the rate-limit windows. Implementations report
/// failures faithfully; deciding whether a failure is fatal belongs to the
/// caller ([`crate::infrastructure::cache::UrlCache`] swallows write errors,
/// the rate limiter propagates them).
///
/// There is no compare-and-set: a `get` followed by a `set` is not atomic.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisStore`] - shared across instances
/// - [`crate::infrastructure::cache::MemoryStore`] - in-process, single instance
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value, expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidTtl`] for a zero TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
