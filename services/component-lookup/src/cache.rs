//! Lookup Cache
//!
//! Bounded LRU memo of completed lookups, keyed by identifier. Lookups still
//! running sit in a separate in-flight table as `OnceCell` slots, so
//! concurrent callers asking for the same identifier wait on a single request
//! and eviction pressure on the LRU never detaches a running lookup.

use bomcode_models::{CacheStats, LookupFailure, LookupOutcome};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<LookupOutcome>>;

struct Entries {
    completed: LruCache<String, LookupOutcome>,
    in_flight: HashMap<String, Slot>,
}

enum Lookup {
    Cached(LookupOutcome),
    Pending(Slot),
}

pub struct LookupCache {
    entries: Mutex<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl LookupCache {
    /// A capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                completed: LruCache::new(capacity),
                in_flight: HashMap::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached outcome for `identifier`, running `resolve` only if
    /// no completed or in-flight lookup exists. Failures are not cached.
    pub async fn get_or_resolve<F, Fut>(&self, identifier: &str, resolve: F) -> Result<LookupOutcome, LookupFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LookupOutcome, LookupFailure>>,
    {
        let slot = match self.lookup(identifier) {
            Lookup::Cached(outcome) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(outcome);
            }
            Lookup::Pending(slot) => slot,
        };

        let mut fetched = false;
        let result = slot
            .get_or_try_init(|| {
                fetched = true;
                resolve()
            })
            .await
            .cloned();

        if !fetched {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return result;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.complete(identifier, &slot, result.as_ref().ok());
        result
    }

    /// Completed outcome, or the in-flight slot to wait on, creating one if
    /// nobody is resolving `identifier` yet.
    fn lookup(&self, identifier: &str) -> Lookup {
        let mut entries = self.entries.lock();
        if let Some(outcome) = entries.completed.get(identifier) {
            return Lookup::Cached(outcome.clone());
        }

        let slot = entries
            .in_flight
            .entry(identifier.to_string())
            .or_default()
            .clone();
        Lookup::Pending(slot)
    }

    /// Retire the in-flight slot this caller resolved and memoize a success.
    fn complete(&self, identifier: &str, slot: &Slot, outcome: Option<&LookupOutcome>) {
        let mut entries = self.entries.lock();
        if entries
            .in_flight
            .get(identifier)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            entries.in_flight.remove(identifier);
        }

        let Some(outcome) = outcome else {
            return;
        };
        if let Some((evicted, _)) = entries.completed.push(identifier.to_string(), outcome.clone()) {
            if evicted != identifier {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(identifier = %evicted, "Evicted lookup from cache");
            }
        }
    }

    /// Completed outcome for `identifier`, without touching recency
    pub fn get(&self, identifier: &str) -> Option<LookupOutcome> {
        self.entries.lock().completed.peek(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.lock().completed.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().completed.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().completed.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity(),
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(bomcode_utils::DEFAULT_CACHE_CAPACITY)
    }
}
