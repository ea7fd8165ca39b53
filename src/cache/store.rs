//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries with a fixed TTL, lazy expiry on
//! read and an explicit sweep for entries nobody reads again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

// == Cache Store ==
/// Key/value storage where every entry lives for the same TTL.
///
/// The store itself is not synchronized; share it as a [`crate::cache::SharedCache`].
/// Values handed out by [`CacheStore::get`] are clones, so callers can never
/// mutate what the cache holds.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Hit / miss counters
    counters: Counters,
    /// Lifetime of every entry in milliseconds
    ttl_ms: u64,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new store backed by the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a new store reading time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            counters: Counters::default(),
            ttl_ms: ttl.as_millis() as u64,
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry wholesale and
    /// restarting its TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(value, now, self.ttl_ms);

        debug!(key = %key, expires_at = entry.expires_at, "Cached entry");
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` if the key was never set, was removed, or has expired.
    /// An expired entry found here is removed on the spot.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.counters.record_miss();
                debug!(key = %key, "Cache miss");
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.counters.record_miss();
            debug!(key = %key, "Cache entry expired, removed");
            return None;
        }

        self.counters.record_hit();
        self.entries.get(key).map(|entry| {
            debug!(
                key = %key,
                age_ms = entry.age_ms(now),
                ttl_remaining_ms = entry.ttl_remaining_ms(now),
                "Cache hit"
            );
            entry.value.clone()
        })
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        debug!(count = self.entries.len(), "Clearing cache");
        self.entries.clear();
    }

    // == Sweep Expired ==
    /// Removes all entries whose expiry lies before now.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns a snapshot of the cache contents and read counters.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let expired = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .count();

        CacheStats {
            total: self.entries.len(),
            valid: self.entries.len() - expired,
            expired,
            hits: self.counters.hits,
            misses: self.counters.misses,
        }
    }

    // == Length ==
    /// Returns the number of entries held, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lifetime given to every entry.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}
