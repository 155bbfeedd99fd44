//! In-process cache store

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::CacheStore;

/// A stored value and its deadline
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Cache store backed by a `HashMap` in process memory
///
/// Deadlines are measured on the monotonic clock. Reads clone the stored
/// value so the lock is never held by a caller.
#[derive(Debug)]
pub struct MemoryCacheStore<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> MemoryCacheStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock can't leave the map half-updated, so
    // poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> Default for MemoryCacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> for MemoryCacheStore<V>
where
    V: Clone + Send,
{
    fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        if Instant::now() >= entry.expires_at {
            debug!(key, "Memory cache entry expired");
            entries.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}
