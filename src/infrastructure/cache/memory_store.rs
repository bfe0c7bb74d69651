//! In-process key-value store with per-key expiry.

use super::service::{CacheError, CacheResult, KeyValueStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Number of entries above which `set` sweeps expired keys.
const SWEEP_THRESHOLD: usize = 10_000;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Key-value store living inside the process.
///
/// Used when Redis is not configured or unreachable, and in tests. State is
/// not shared between instances, so rate limits apply per instance.
/// Expired entries are dropped lazily on read and swept when the map grows.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Using in-process key-value store");
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or(now + Duration::from_secs(u32::MAX as u64));
        let mut entries = self.entries.lock();

        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, entry| entry.expires_at > now);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
