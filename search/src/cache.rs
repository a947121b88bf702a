//! Bounded memo tables shared by every search on an engine.
//!
//! Both engine caches memoize pure functions (`Model::explore` and
//! `Model::apply`), so a racing duplicate computation or an eviction only
//! costs time, never correctness.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use greedy_kernel::model::Model;
use lru::LruCache;

use crate::asset::Asset;

/// Findings memoized per model.
pub type ExploreCache<M> = Memo<Arc<M>, Arc<[<M as Model>::Finding]>>;

/// Successor models memoized per `(model, finding)`.
pub type AssetCache<M> = Memo<Asset<M>, Arc<M>>;

/// LRU memo table with hit/miss counters.
pub struct Memo<K: Hash + Eq, V: Clone> {
    cache: Mutex<LruCache<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> Memo<K, V> {
    /// Create a memo holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, counting the hit or miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.lock().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    /// Return the memoized value for `key`, computing and storing it on a
    /// miss. The computation runs outside the lock.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Return (hits, misses) since creation or the last clear.
    #[must_use]
    pub fn counters(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl<K: Hash + Eq, V: Clone> std::fmt::Debug for Memo<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hits, misses) = self.counters();
        f.debug_struct("Memo")
            .field("len", &self.len())
            .field("hits", &hits)
            .field("misses", &misses)
            .finish_non_exhaustive()
    }
}
