//! Cache Module
//!
//! Process-local key/value cache with a fixed TTL, lazy expiry on read and
//! periodic sweeping. Type-agnostic: callers choose the value type and build
//! their own keys.

mod clock;
mod entry;
mod stats;
mod store;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Lifetime of a cached entry when not configured otherwise
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Interval between background sweeps when not configured otherwise
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A cache store behind a single whole-structure lock.
pub type SharedCache<V> = Arc<RwLock<CacheStore<V>>>;

/// Wraps a store so it can be shared between request handlers and the
/// sweep task.
pub fn shared<V: Clone>(store: CacheStore<V>) -> SharedCache<V> {
    Arc::new(RwLock::new(store))
}
