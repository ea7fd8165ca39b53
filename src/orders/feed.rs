//! Cached order feed
//!
//! Checks the cache, falls back to the order source on a miss, and stores
//! whatever the source returned. Failed fetches are never cached.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::error::SourceError;
use crate::orders::{OrderQuery, OrderSource};

/// Orders plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedOrders {
    pub orders: Value,
    /// True when served from the cache without calling the source
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct CachedOrderFeed {
    cache: SharedCache<Value>,
    source: Arc<dyn OrderSource>,
}

impl CachedOrderFeed {
    pub fn new(cache: SharedCache<Value>, source: Arc<dyn OrderSource>) -> Self {
        Self { cache, source }
    }

    /// Returns the orders for `query`.
    ///
    /// With `force` set the cache is bypassed and the fresh result replaces
    /// whatever was cached. The cache lock is never held while the source is
    /// being called.
    pub async fn get(&self, query: &OrderQuery, force: bool) -> Result<FetchedOrders, SourceError> {
        let key = query.cache_key();

        if !force {
            let hit = self.cache.write().await.get(&key);
            if let Some(orders) = hit {
                debug!(key = %key, "Serving orders from cache");
                return Ok(FetchedOrders {
                    orders,
                    cached: true,
                });
            }
        }

        let orders = self.source.fetch(query).await?;
        info!(key = %key, force, "Fetched orders from source");

        self.cache.write().await.set(key, orders.clone());

        Ok(FetchedOrders {
            orders,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{self, CacheStore, ManualClock};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    /// Source returning a counter so each fetch is distinguishable.
    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicU32,
        failing: AtomicBool,
    }

    #[async_trait]
    impl OrderSource for CountingSource {
        async fn fetch(&self, query: &OrderQuery) -> Result<Value, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err(SourceError::Request("HTTP 503".to_string()));
            }
            Ok(json!([{ "key": query.cache_key(), "fetch": n }]))
        }
    }

    fn feed() -> (CachedOrderFeed, Arc<CountingSource>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = CacheStore::with_clock(Duration::from_secs(3600), clock.clone());
        let source = Arc::new(CountingSource::default());
        let feed = CachedOrderFeed::new(cache::shared(store), source.clone());
        (feed, source, clock)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (feed, source, _) = feed();
        let query = OrderQuery::single("A100");

        let first = feed.get(&query, false).await.unwrap();
        assert!(!first.cached);

        let second = feed.get(&query, false).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.orders, first.orders);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refreshes_entry() {
        let (feed, source, _) = feed();
        let query = OrderQuery::single("A100");

        feed.get(&query, false).await.unwrap();
        let forced = feed.get(&query, true).await.unwrap();
        assert!(!forced.cached);
        assert_eq!(forced.orders[0]["fetch"], 2);

        let after = feed.get(&query, false).await.unwrap();
        assert!(after.cached);
        assert_eq!(after.orders[0]["fetch"], 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let (feed, source, clock) = feed();
        let query = OrderQuery::single("A100");

        feed.get(&query, false).await.unwrap();
        clock.advance(Duration::from_secs(3601));

        let refreshed = feed.get(&query, false).await.unwrap();
        assert!(!refreshed.cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let (feed, source, _) = feed();
        let query = OrderQuery::single("A100");

        source.failing.store(true, Ordering::SeqCst);
        assert!(feed.get(&query, false).await.is_err());

        source.failing.store(false, Ordering::SeqCst);
        let ok = feed.get(&query, false).await.unwrap();
        assert!(!ok.cached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_results_are_cached() {
        #[derive(Debug)]
        struct EmptySource;

        #[async_trait]
        impl OrderSource for EmptySource {
            async fn fetch(&self, _: &OrderQuery) -> Result<Value, SourceError> {
                Ok(json!([]))
            }
        }

        let cache = cache::shared(CacheStore::new(Duration::from_secs(60)));
        let feed = CachedOrderFeed::new(cache, Arc::new(EmptySource));
        let query = OrderQuery::single("missing");

        feed.get(&query, false).await.unwrap();
        let again = feed.get(&query, false).await.unwrap();
        assert!(again.cached);
        assert_eq!(again.orders, json!([]));
    }
}
