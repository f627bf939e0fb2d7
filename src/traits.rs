//! # The uniform cache contract
//!
//! Every eviction policy in this crate is usable through one small
//! capability interface, [`CachePolicy`]. That is what lets the sharded
//! wrapper stripe an arbitrary policy, and what lets driver code run every
//! policy through the same loop.
//!
//! ```text
//!                 ┌──────────────────────────────────────┐
//!                 │          CachePolicy<K, V>           │
//!                 │                                      │
//!                 │  get(&self, &K)  → Option<V>         │
//!                 │  put(&self, K, V)                    │
//!                 │  purge(&self)                        │
//!                 │  len(&self) / capacity(&self)        │
//!                 └──────────────────┬───────────────────┘
//!                                    │
//!        ┌──────────────┬────────────┼────────────┬──────────────────┐
//!        ▼              ▼            ▼            ▼                  ▼
//!    LruCache       LrukCache     LfuCache     ArcCache      ShardedCache<P>
//! ```
//!
//! ## Contract
//!
//! | Op | On hit | On miss |
//! |----|--------|---------|
//! | `get` | policy-specific touch, returns a value snapshot | `None`; no state change except LRU-K history |
//! | `put` | overwrite + touch | insert, evicting exactly one entry first when full |
//! | `purge` | clears entries *and* every auxiliary structure (history, ghosts, aging counters) | — |
//!
//! A capacity of 0 makes `put` a no-op and `get` a guaranteed miss; no
//! eviction is ever attempted. `get` hands back an owned clone — an
//! independent snapshot, never a reference into cache-internal state.
//!
//! ## Concurrency
//!
//! Methods take `&self`: each implementation synchronizes internally with a
//! single `parking_lot::Mutex` around its core, so operations on one policy
//! instance are linearizable. The deeper policy-specific surface (peeking
//! the next victim, reading a key's frequency) lives on the unlocked
//! `*Core` types, which the locked caches wrap.

/// Uniform contract shared by all eviction policies.
///
/// # Example
///
/// ```
/// use evictkit::prelude::*;
///
/// fn warm<C: CachePolicy<u64, String>>(cache: &C, rows: &[(u64, String)]) {
///     for (key, value) in rows {
///         cache.put(*key, value.clone());
///     }
/// }
///
/// let cache = LruCache::new(100);
/// warm(&cache, &[(1, "one".into()), (2, "two".into())]);
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CachePolicy<K, V> {
    /// Looks up `key`, applying the policy's touch on a hit.
    ///
    /// Returns an owned snapshot of the value, or `None` on a miss. A miss
    /// is a normal outcome, never an error.
    fn get(&self, key: &K) -> Option<V>;

    /// Inserts or overwrites `key`.
    ///
    /// If the key is resident its value is replaced and the entry touched.
    /// Otherwise the policy evicts exactly one entry when full, then admits
    /// the new one. With capacity 0 this is a no-op.
    fn put(&self, key: K, value: V);

    /// Drops every entry and resets all auxiliary structures.
    fn purge(&self);

    /// Number of resident entries.
    fn len(&self) -> usize;

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    // Minimal implementation exercising the trait surface and object safety.
    struct SingleSlot {
        slot: Mutex<Option<(u32, String)>>,
    }

    impl CachePolicy<u32, String> for SingleSlot {
        fn get(&self, key: &u32) -> Option<String> {
            let slot = self.slot.lock();
            slot.as_ref().filter(|(k, _)| k == key).map(|(_, v)| v.clone())
        }

        fn put(&self, key: u32, value: String) {
            *self.slot.lock() = Some((key, value));
        }

        fn purge(&self) {
            *self.slot.lock() = None;
        }

        fn len(&self) -> usize {
            usize::from(self.slot.lock().is_some())
        }

        fn capacity(&self) -> usize {
            1
        }
    }

    #[test]
    fn trait_is_object_safe() {
        let cache: Box<dyn CachePolicy<u32, String>> = Box::new(SingleSlot {
            slot: Mutex::new(None),
        });
        cache.put(1, "one".to_string());
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.get(&2), None);
        assert!(!cache.is_empty());
        cache.purge();
        assert!(cache.is_empty());
    }
}
