pub mod memory;

use crate::core::cache::Cache;
use memory::MemoryCache;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Response cache shared by all aggregation services.
///
/// Payloads are stored as opaque JSON values so a single store can hold
/// quotes, rates, articles and indicators under their own keys.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<dyn Cache<String, Value>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_backend(Arc::new(MemoryCache::<String, Value>::new()))
    }

    pub fn with_backend(inner: Arc<dyn Cache<String, Value>>) -> Self {
        Self { inner }
    }

    /// Returns the raw payload for `key`.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(&key.to_string()).await
    }

    pub async fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.inner.put(key.to_string(), value, Some(ttl)).await;
    }

    /// Returns the decoded payload for `key`. A payload that does not decode
    /// as `T` is treated as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache payload");
                None
            }
        }
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json, ttl).await,
            Err(e) => debug!(key, error = %e, "Skipping cache write for unserializable payload"),
        }
    }

    pub async fn remove(&self, key: &str) {
        self.inner.remove(&key.to_string()).await;
    }

    pub async fn clear(&self) {
        self.inner.clear().await;
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
