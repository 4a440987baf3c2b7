//! Price caching with TTL support.

use chrono::Duration;
use dashmap::DashMap;
use ratecalc_common::{age, Clock, SystemClock, Timestamp};
use std::sync::Arc;
use tracing::debug;

/// Cached price entry.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: f64,
    cached_at: Timestamp,
}

/// Thread-safe price cache with TTL.
///
/// Entries are never swept in the background. A stale entry is dropped the
/// first time it is read after its TTL has elapsed.
pub struct PriceCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PriceCache {
    /// Create a new price cache reading the wall clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a new price cache with a custom clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a value from cache if it is not older than the TTL.
    pub fn get(&self, key: &str) -> Option<f64> {
        let entry = *self.cache.get(key)?;

        if age(self.clock.as_ref(), entry.cached_at) > self.ttl {
            debug!(key, "Cache entry expired");
            // Only drop the entry we judged stale; a concurrent set may have replaced it.
            self.cache
                .remove_if(key, |_, current| current.cached_at == entry.cached_at);
            return None;
        }

        debug!(key, value = entry.value, "Cache hit");
        Some(entry.value)
    }

    /// Insert a value, overwriting any prior entry for the key.
    pub fn set(&self, key: impl Into<String>, value: f64) {
        let key = key.into();
        debug!(key = %key, value, "Caching value");

        self.cache.insert(
            key,
            CacheEntry {
                value,
                cached_at: self.clock.now(),
            },
        );
    }

    /// Get the number of entries in cache, stale ones included.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Shared price cache.
pub type SharedPriceCache = Arc<PriceCache>;
