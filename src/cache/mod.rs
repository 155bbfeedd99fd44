//! Cache module for time-bounded feed snapshots
//!
//! [`CacheStore`] is the capability the feed service depends on. Two stores
//! implement it: [`MemoryCacheStore`] keeps entries in process memory, and
//! [`FileCacheStore`] persists them as JSON files in an XDG-compliant cache
//! directory so they survive between runs. Both expire entries lazily: an
//! entry past its deadline is removed the first time it is read.

mod disk;
mod memory;

pub use disk::FileCacheStore;
pub use memory::MemoryCacheStore;

use std::sync::Arc;
use std::time::Duration;

/// A key/value store whose entries expire after a time-to-live
///
/// All operations are total. A store that hits an internal failure treats it
/// as a miss (on `get`) or drops the write (on `set`).
pub trait CacheStore<V>: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key` until `ttl` has elapsed, replacing any prior entry
    ///
    /// A zero `ttl` makes the entry expire on the next read.
    fn set(&self, key: &str, value: V, ttl: Duration);

    /// Removes the entry for `key`, if any
    fn delete(&self, key: &str);
}

impl<V, C> CacheStore<V> for Arc<C>
where
    C: CacheStore<V> + ?Sized,
{
    fn get(&self, key: &str) -> Option<V> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }
}
