//! Per-key sharing of in-flight loads.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

type Shared = Arc<dyn Any + Send + Sync>;

/// Lets concurrent callers asking for the same key wait on a single load
/// instead of each starting their own. A key is released as soon as its load
/// completes, so later callers start fresh (and normally hit the cache).
#[derive(Default)]
pub struct Coalescer {
    in_flight: Mutex<HashMap<String, Arc<OnceCell<Shared>>>>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `load` for `key` unless a load for it is already in flight, in
    /// which case its result is shared. Returns `None` only if the in-flight
    /// load for `key` produced a different type.
    pub async fn run<T, F, Fut>(&self, key: &str, load: F) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(key) {
                Some(cell) => {
                    debug!(key, "Joining in-flight load");
                    Arc::clone(cell)
                }
                None => {
                    let cell = Arc::new(OnceCell::new());
                    in_flight.insert(key.to_string(), Arc::clone(&cell));
                    cell
                }
            }
        };

        let shared = cell
            .get_or_init(|| async { Arc::new(load().await) as Shared })
            .await
            .clone();

        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight
                .get(key)
                .is_some_and(|current| Arc::ptr_eq(current, &cell))
            {
                in_flight.remove(key);
            }
        }

        shared.downcast_ref::<T>().cloned()
    }

    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_loads_are_shared() {
        let coalescer = Coalescer::new();
        let calls = AtomicUsize::new(0);
        let load = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            42u32
        };

        let (a, b) = tokio::join!(coalescer.run("k", load), coalescer.run("k", load));

        assert_eq!(a, Some(42));
        assert_eq!(b, Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coalescer.in_flight().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_load_independently() {
        let coalescer = Coalescer::new();
        let calls = AtomicUsize::new(0);
        let load = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            "value".to_string()
        };

        let (a, b) = tokio::join!(coalescer.run("a", load), coalescer.run("b", load));

        assert_eq!(a.as_deref(), Some("value"));
        assert_eq!(b.as_deref(), Some("value"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_key_is_released_after_completion() {
        let coalescer = Coalescer::new();
        let calls = AtomicUsize::new(0);
        let load = || async { calls.fetch_add(1, Ordering::SeqCst) };

        assert_eq!(coalescer.run("k", load).await, Some(0));
        assert_eq!(coalescer.run("k", load).await, Some(1));
        assert_eq!(coalescer.in_flight().await, 0);
    }
}
