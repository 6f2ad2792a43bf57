//! Generic single-flight keyed store.
//!
//! Concurrent requests for the same key must see at-most-one in-flight
//! build. Each key gets its own `OnceCell` behind a short-held `Mutex`
//! that only guards the map itself, so a build in progress for one key
//! never blocks a lookup of a different key.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

pub struct SingleFlightStore<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for SingleFlightStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> SingleFlightStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` if present, without triggering a build.
    pub async fn get(&self, key: &K) -> Option<V> {
        let slots = self.slots.lock().await;
        match slots.get(key) {
            Some(cell) => cell.get().cloned(),
            None => None,
        }
    }

    /// Returns the cached value for `key`, building it with `build` if absent.
    /// Concurrent callers for the same key share exactly one invocation of
    /// `build`; all others await its result.
    ///
    /// The returned `bool` is `true` when this call rode along on another
    /// caller's build (in flight or already complete) rather than running
    /// `build` itself — the distinction `ResultCache` needs to mark a
    /// waiter's `PipelineResult` as `cached`.
    ///
    /// # Errors
    /// Propagates whatever error `build` returns. The key is not populated
    /// on error, so a later call will retry.
    pub async fn get_or_build<F, Fut, E>(&self, key: K, build: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        let (cell, is_waiter) = {
            let mut slots = self.slots.lock().await;
            match slots.get(&key) {
                Some(cell) => (cell.clone(), true),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    slots.insert(key, cell.clone());
                    (cell, false)
                }
            }
        };
        let value = cell.get_or_try_init(build).await?.clone();
        Ok((value, is_waiter))
    }

    /// Removes an entry, forcing the next `get_or_build` to rebuild it.
    /// Used on `CacheCorruption`: the key is evicted and treated as a
    /// miss rather than returning the corrupted value.
    pub async fn evict(&self, key: &K) {
        let mut slots = self.slots.lock().await;
        slots.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn concurrent_builds_for_same_key_run_once() {
        let store: Arc<SingleFlightStore<&'static str, u32>> = Arc::new(SingleFlightStore::new());
        let build_count = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let build_count = build_count.clone();
            handles.push(tokio::spawn(async move {
                store
                    .get_or_build("doc-a", || async {
                        build_count.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok::<u32, std::convert::Infallible>(42)
                    })
                    .await
            }));
        }

        let mut waiter_count = 0;
        for handle in handles {
            let (value, is_waiter) = handle.await.unwrap().unwrap();
            assert_eq!(value, 42);
            if is_waiter {
                waiter_count += 1;
            }
        }
        assert_eq!(build_count.load(Ordering::SeqCst), 1);
        assert_eq!(waiter_count, 7, "exactly one of the 8 concurrent callers should be the builder");
    }

    #[tokio::test]
    async fn eviction_forces_rebuild() {
        let store: SingleFlightStore<&'static str, u32> = SingleFlightStore::new();
        let build_count = AtomicU32::new(0);

        let build = || async {
            build_count.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, std::convert::Infallible>(1)
        };
        let (_, first_is_waiter) = store.get_or_build("k", build).await.unwrap();
        assert!(!first_is_waiter);
        store.evict(&"k").await;
        let (_, second_is_waiter) = store.get_or_build("k", build).await.unwrap();
        assert!(!second_is_waiter, "a rebuild after eviction is a fresh builder, not a waiter");

        assert_eq!(build_count.load(Ordering::SeqCst), 2);
    }
}
