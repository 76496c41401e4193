//! In-memory result cache with single-flight computation.
//!
//! Each key owns a slot that is initialised at most once. Concurrent callers
//! for the same key block on the slot while the first caller computes, then
//! all share the same `Arc`. Failed computations are handed to every waiter
//! and then evicted, so the next request retries.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use stockscope_core::fingerprint::RequestFingerprint;
use stockscope_core::AnalysisError;

use crate::pipeline::AnalysisReport;

type Slot<V> = Arc<OnceLock<Result<Arc<V>, AnalysisError>>>;

struct Slots<K, V> {
    map: HashMap<K, Slot<V>>,
    /// Insertion order, oldest first, for capacity eviction.
    order: VecDeque<K>,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Single-flight memo keyed by `K`.
pub struct SingleFlight<K, V> {
    slots: Mutex<Slots<K, V>>,
    capacity: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache of full analysis reports keyed by request fingerprint.
pub type AnalysisCache = SingleFlight<RequestFingerprint, AnalysisReport>;

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Keep at most `capacity` entries; the oldest key is evicted first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots<K, V>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached value for `key`, or run `compute` exactly once
    /// across all concurrent callers and cache its success.
    pub fn get_or_compute<F>(&self, key: &K, compute: F) -> Result<Arc<V>, AnalysisError>
    where
        F: FnOnce() -> Result<V, AnalysisError>,
    {
        let slot = {
            let mut slots = self.lock();
            match slots.map.get(key) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let slot: Slot<V> = Arc::new(OnceLock::new());
                    slots.map.insert(key.clone(), Arc::clone(&slot));
                    slots.order.push_back(key.clone());
                    self.evict_over_capacity(&mut slots);
                    slot
                }
            }
        };

        let mut computed = false;
        let result = slot
            .get_or_init(|| {
                computed = true;
                compute().map(Arc::new)
            })
            .clone();

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("result cache hit");
        }

        if result.is_err() {
            let mut slots = self.lock();
            // Only drop the slot we observed; a retry may already have replaced it.
            if slots.map.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                slots.map.remove(key);
                slots.order.retain(|k| k != key);
            }
        }

        result
    }

    /// Cached value if a successful computation has finished.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.lock().map.get(key).cloned()?;
        match slot.get() {
            Some(Ok(v)) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    /// Forget `key`. Callers already waiting on it still receive its result.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut slots = self.lock();
        slots.order.retain(|k| k != key);
        slots.map.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut slots = self.lock();
        slots.map.clear();
        slots.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn evict_over_capacity(&self, slots: &mut Slots<K, V>) {
        let Some(cap) = self.capacity else { return };
        while slots.map.len() > cap {
            let Some(oldest) = slots.order.pop_front() else { break };
            slots.map.remove(&oldest);
            tracing::debug!(entries = slots.map.len(), "evicted oldest cache entry");
        }
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
