//! Caller-owned memoization
//!
//! The engine itself is stateless. Callers that re-render the same data
//! (a dashboard polling every few seconds) can hold a [`MemoCache`] to skip
//! recomputation. Time is passed in by the caller in milliseconds, so the
//! cache works the same in the browser and in native tests.

use lru::LruCache;
use std::num::NonZeroUsize;
use tracing::trace;

/// Key for one call: the serialized inputs themselves, so distinct inputs
/// never share an entry
pub fn cache_key(parts: &[&str]) -> String {
    // A JSON array keeps part boundaries unambiguous
    serde_json::to_string(parts).unwrap_or_else(|_| parts.join("\u{1f}"))
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at_ms: f64,
    expires_at_ms: f64,
}

impl<V> Entry<V> {
    /// A clock that went backwards also invalidates
    fn is_expired(&self, now_ms: f64) -> bool {
        now_ms < self.stored_at_ms || now_ms >= self.expires_at_ms
    }
}

/// Bounded cache with oldest-first eviction and a time-to-live
pub struct MemoCache<V> {
    /// `None` when caching is disabled (zero capacity)
    store: Option<LruCache<String, Entry<V>>>,
    ttl_ms: f64,
}

impl<V: Clone> MemoCache<V> {
    /// A zero capacity disables caching
    pub fn new(capacity: usize, ttl_ms: f64) -> Self {
        Self {
            store: NonZeroUsize::new(capacity).map(LruCache::new),
            ttl_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.store.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.clear();
        }
    }

    /// Look up a live entry; an expired one is removed
    ///
    /// Lookups do not refresh recency, so eviction stays oldest-inserted
    /// first.
    pub fn get(&mut self, key: &str, now_ms: f64) -> Option<V> {
        let store = self.store.as_mut()?;
        if store.peek(key)?.is_expired(now_ms) {
            store.pop(key);
            return None;
        }
        store.peek(key).map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any entry with the same key
    pub fn insert(&mut self, key: String, value: V, now_ms: f64) {
        let ttl = self.ttl_ms;
        if let Some(store) = self.store.as_mut() {
            if let Some((evicted, _)) = store.push(
                key.clone(),
                Entry {
                    value,
                    stored_at_ms: now_ms,
                    expires_at_ms: now_ms + ttl,
                },
            ) {
                if evicted != key {
                    trace!(len = store.len(), "Memo cache evicted oldest entry");
                }
            }
        }
    }

    /// Return the cached value or compute, store and return a fresh one
    pub fn get_or_try_insert_with<E, F>(&mut self, key: String, now_ms: f64, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.purge_expired(now_ms);
        if let Some(hit) = self.get(&key, now_ms) {
            trace!("Memo cache hit");
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value.clone(), now_ms);
        Ok(value)
    }

    /// Drop every entry expired as of `now_ms`
    pub fn purge_expired(&mut self, now_ms: f64) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let expired: Vec<String> = store
            .iter()
            .filter(|(_, entry)| entry.is_expired(now_ms))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            store.pop(key);
        }
        if !expired.is_empty() {
            trace!(removed = expired.len(), "Purged expired memo entries");
        }
    }
}
