//! In-memory TTL cache with cache-aside access.
//!
//! Reads go through `DashMap` shards without a global lock. Expired entries
//! are dropped lazily when they are next read. Misses for the same key are
//! coalesced behind a per-key async mutex so only one caller runs `compute`
//! while the others wait for its result. The last caller out removes the
//! mutex again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Deadline used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL cache keyed by string.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            inflight: DashMap::new(),
        }
    }
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, e| e.expires_at <= now);
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.entries
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache-aside lookup.
    ///
    /// A live entry is returned without calling `compute`. Otherwise `compute`
    /// runs, and only a successful result is stored for `ttl`. Errors are
    /// returned unchanged and nothing is cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        let lock = self.inflight.entry(key.to_string()).or_default().clone();
        let outcome = {
            let _guard = lock.lock().await;

            // Another caller may have filled the entry while we waited.
            if let Some(value) = self.get(key) {
                tracing::debug!(key, "cache filled by concurrent caller");
                Ok(value)
            } else {
                tracing::debug!(key, "cache miss");
                compute().await.inspect(|value| {
                    self.insert(key, value.clone(), ttl);
                })
            }
        };

        drop(lock);
        self.inflight
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        outcome
    }

    /// Number of keys with a miss in progress.
    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }
}

/// Builds a cache key from parts: joined with `.`, upper-cased, and every
/// character outside `[A-Z0-9._-]` replaced by `_`.
///
/// `cache_key(&["rate", "EUR", "usd"])` is `"RATE.EUR.USD"`.
pub fn cache_key(parts: &[&str]) -> String {
    parts
        .join(".")
        .to_uppercase()
        .chars()
        .map(|c| match c {
            'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}
