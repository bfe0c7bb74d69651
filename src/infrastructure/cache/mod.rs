//! Caching layer for fast redirect lookups and rate-limit windows.
//!
//! Provides a [`KeyValueStore`] trait with two implementations:
//! - [`RedisStore`] - shared Redis store for multi-instance deployments
//! - [`MemoryStore`] - in-process store for single instances and tests
//!
//! [`UrlCache`] layers the cache-aside URL helpers on top of either store.

mod memory_store;
mod redis_store;
mod service;
mod url_cache;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
pub use service::{CacheError, CacheResult, KeyValueStore};
pub use url_cache::{DEFAULT_URL_TTL, URL_KEY_PREFIX, UrlCache, url_ttl};
