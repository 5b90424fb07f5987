//! Cache abstraction shared by every aggregation service

use async_trait::async_trait;
use std::time::Duration;

/// Keyed store with optional per-entry time-to-live.
///
/// Expiry is checked lazily: an entry whose TTL has elapsed is reported as a
/// miss (and dropped) on the next `get`. There is no background sweep.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Clone + Send + Sync,
{
    /// Returns the value if present and not expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores a value, replacing any previous one. `None` never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
