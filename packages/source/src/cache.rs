//! Process-lifetime memoization of fetched datasets.
//!
//! [`Cache`] stores values behind `Arc` so hits are cheap to hand out. Reads
//! take a shared lock; no lock is ever held across an `.await`, which means
//! two concurrent misses on the same key may both compute. The later insert
//! wins. Which entries survive is decided by an [`EvictionPolicy`].

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Decides which keys to evict as the cache is used.
pub trait EvictionPolicy<K>: Send {
    /// Records a cache hit on `key`.
    fn touch(&mut self, key: &K);

    /// Records an insertion and returns the keys that must be evicted.
    fn insert(&mut self, key: &K) -> Vec<K>;

    /// Forgets `key`.
    fn remove(&mut self, key: &K);

    /// Forgets everything.
    fn clear(&mut self);
}

/// Keeps every entry forever.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl<K> EvictionPolicy<K> for Unbounded {
    fn touch(&mut self, _key: &K) {}

    fn insert(&mut self, _key: &K) -> Vec<K> {
        Vec::new()
    }

    fn remove(&mut self, _key: &K) {}

    fn clear(&mut self) {}
}

/// Keeps at most `capacity` entries, evicting the least recently used.
#[derive(Debug, Clone)]
pub struct LeastRecentlyUsed<K> {
    capacity: usize,
    order: VecDeque<K>,
}

impl<K> LeastRecentlyUsed<K> {
    /// Creates a policy holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
        }
    }
}

impl<K: Clone + Ord + Send> EvictionPolicy<K> for LeastRecentlyUsed<K> {
    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn insert(&mut self, key: &K) -> Vec<K> {
        self.remove(key);
        self.order.push_back(key.clone());

        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(k) = self.order.pop_front() {
                evicted.push(k);
            }
        }
        evicted
    }

    fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}

/// Memoizing key/value store with a swappable eviction policy.
pub struct Cache<K, V> {
    entries: RwLock<BTreeMap<K, Arc<V>>>,
    policy: Mutex<Box<dyn EvictionPolicy<K>>>,
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Cache").field("len", &len).finish()
    }
}

impl<K: Ord + Clone + Send + 'static, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + Send + 'static, V> Cache<K, V> {
    /// Creates an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(Unbounded)
    }

    /// Creates a cache that holds at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_policy(LeastRecentlyUsed::new(capacity))
    }
}

impl<K: Ord + Clone, V> Cache<K, V> {
    /// Creates a cache governed by `policy`.
    #[must_use]
    pub fn with_policy(policy: impl EvictionPolicy<K> + 'static) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            policy: Mutex::new(Box::new(policy)),
        }
    }

    /// Returns the cached value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let hit = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        if hit.is_some() {
            self.policy
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .touch(key);
        }
        hit
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let evicted = self
            .policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(&key);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for k in &evicted {
            entries.remove(k);
        }
        entries.insert(key, Arc::clone(&value));
        value
    }

    /// Returns the cached value or computes, stores, and returns it.
    ///
    /// Errors from `compute` are returned unchanged and nothing is stored,
    /// so the next call for the same key computes again.
    ///
    /// # Errors
    ///
    /// Returns whatever error `compute` produces.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute().await?;
        Ok(self.insert(key, value))
    }

    /// Removes `key`, returning its value if it was cached.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn insert_then_get() {
        let cache: Cache<u32, String> = Cache::new();
        cache.insert(1, "one".to_string());

        assert_eq!(cache.get(&1).as_deref(), Some(&"one".to_string()));
        assert!(cache.get(&2).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn lru_evicts_least_recently_used() {
        let cache: Cache<u32, u32> = Cache::with_capacity(2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert!(cache.get(&1).is_some());
        cache.insert(3, 30);

        assert!(cache.get(&1).is_some());
        assert!(cache.get(&2).is_none());
        assert!(cache.get(&3).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn reinserting_does_not_evict_itself() {
        let cache: Cache<u32, u32> = Cache::with_capacity(1);
        cache.insert(1, 10);
        cache.insert(1, 11);

        assert_eq!(cache.get(&1).as_deref(), Some(&11));
    }

    #[test]
    fn remove_and_clear() {
        let cache: Cache<u32, u32> = Cache::with_capacity(4);
        cache.insert(1, 10);
        cache.insert(2, 20);

        assert_eq!(cache.remove(&1).as_deref(), Some(&10));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn computes_once_per_key() {
        let cache: Cache<u32, u32> = Cache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute(7, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(49)
                })
                .await
                .unwrap();
            assert_eq!(*value, 49);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: Cache<u32, u32> = Cache::new();

        let first = cache.get_or_compute(1, || async { Err("offline") }).await;
        assert_eq!(first.unwrap_err(), "offline");
        assert!(cache.is_empty());

        let second = cache
            .get_or_compute(1, || async { Ok::<_, &str>(5) })
            .await
            .unwrap();
        assert_eq!(*second, 5);
    }
}
