//! Least Recently Used (LRU) replacement policy.
//!
//! The classic recency policy: a hit moves the entry to the most-recent end
//! of a single order list; when full, the entry that has gone longest
//! without a touch is evicted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         LruCore<K, V> Layout                        │
//! │                                                                     │
//! │   index: FxHashMap<K, SlotId>        order: OrderList<Entry<K, V>>  │
//! │                                                                     │
//! │   ┌─────────┬────────┐                                              │
//! │   │  Key    │ SlotId │      front ─► [k1] ◄──► [k2] ◄──► [k3] ◄─ back
//! │   ├─────────┼────────┤               LRU                  MRU      │
//! │   │   k1    │  id_0  │─────────────► victim                        │
//! │   │   k2    │  id_1  │                                             │
//! │   │   k3    │  id_2  │          get/put touch ──────────► to back  │
//! │   └─────────┴────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The eviction victim is deterministic: always the front of the order
//! list. Ties cannot occur by construction.
//!
//! ## Key Components
//!
//! - [`LruCore`]: single-threaded core with the full policy surface
//! - [`LruCache`]: `Mutex`-wrapped core implementing
//!   [`CachePolicy`](crate::traits::CachePolicy)
//!
//! ## Operations
//!
//! | Operation | Time | Notes                                    |
//! |-----------|------|------------------------------------------|
//! | `get`     | O(1) | detach + reattach at the MRU end         |
//! | `put`     | O(1) | may evict the front entry first          |
//! | `remove`  | O(1) | arbitrary key removal                    |
//! | `pop_lru` | O(1) | explicit eviction                        |
//!
//! ## Thread Safety
//!
//! `LruCore` is single-threaded (`&mut self`); `LruCache` owns one
//! `parking_lot::Mutex` and is `Clone`, so it can be shared across threads
//! directly.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::order_list::OrderList;
use crate::ds::slot_pool::SlotId;
use crate::error::InvariantError;
use crate::traits::CachePolicy;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU core: one recency order plus a key index.
#[derive(Debug)]
pub struct LruCore<K, V> {
    order: OrderList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries.
    ///
    /// Capacity 0 is legal: every `put` is a no-op and every `get` misses.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: OrderList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `key` is resident, without touching it.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.move_to_back(id);
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without affecting recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    /// The current eviction victim, without touching it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.order.front().map(|entry| (&entry.key, &entry.value))
    }

    /// Inserts or overwrites `key`, returning the previous value if any.
    ///
    /// A new key evicts the front entry first when the core is full.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_back(id);
            let entry = self.order.get_mut(id)?;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        if self.capacity == 0 {
            return None;
        }
        if self.index.len() >= self.capacity {
            self.pop_lru();
        }

        let id = self.order.push_back(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.order.remove(id).map(|entry| entry.value)
    }

    /// Evicts and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.order.pop_front()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    /// Verifies that the index and the recency order agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.order.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "order holds {} entries but index holds {}",
                self.order.len(),
                self.index.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.order.get(id) {
                Some(entry) if &entry.key == key => {}
                _ => {
                    return Err(InvariantError::new(
                        "index entry does not resolve to its order node",
                    ));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Thread-safe wrapper
// ---------------------------------------------------------------------------

/// Thread-safe LRU cache: an [`LruCore`] behind one mutex.
///
/// Cloning is cheap and shares the same underlying cache.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = LruCache::new(2);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.get(&1);          // touch: 2 is now the victim
/// cache.put(3, "c");      // evicts 2
///
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("a"));
/// ```
#[derive(Clone)]
pub struct LruCache<K, V> {
    inner: Arc<Mutex<LruCore<K, V>>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LruCore::new(capacity))),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Returns `true` if `key` is resident, without touching it.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Runs `f` under the cache lock with direct core access.
    ///
    /// Intended for tests and diagnostics that need the richer core surface
    /// (victim peeking, invariant checks) without racing other threads.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut LruCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    fn purge(&self) {
        self.inner.lock().clear();
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut core = LruCore::new(3);
        core.put(1, "a");
        core.put(2, "b");
        core.put(3, "c");

        core.get(&1);
        assert_eq!(core.peek_lru().map(|(k, _)| *k), Some(2));

        core.put(4, "d");
        assert!(!core.contains(&2));
        assert_eq!(core.peek(&1), Some(&"a"));
        assert_eq!(core.peek(&3), Some(&"c"));
        assert_eq!(core.peek(&4), Some(&"d"));
        core.check_invariants().unwrap();
    }

    #[test]
    fn put_existing_overwrites_and_touches() {
        let mut core = LruCore::new(2);
        core.put(1, "a");
        core.put(2, "b");

        assert_eq!(core.put(1, "a2"), Some("a"));
        assert_eq!(core.peek_lru().map(|(k, _)| *k), Some(2));
        assert_eq!(core.len(), 2);
    }

    #[test]
    fn repeated_get_never_evicts() {
        let mut core = LruCore::new(2);
        core.put(1, "a");
        core.put(2, "b");
        for _ in 0..100 {
            assert_eq!(core.get(&1), Some(&"a"));
        }
        assert_eq!(core.len(), 2);
        assert!(core.contains(&2));
    }

    #[test]
    fn zero_capacity_is_inert() {
        let mut core: LruCore<u32, &str> = LruCore::new(0);
        assert_eq!(core.put(1, "a"), None);
        assert_eq!(core.get(&1), None);
        assert_eq!(core.len(), 0);
        assert_eq!(core.pop_lru(), None);
        core.check_invariants().unwrap();
    }

    #[test]
    fn peek_does_not_touch() {
        let mut core = LruCore::new(2);
        core.put(1, "a");
        core.put(2, "b");
        assert_eq!(core.peek(&1), Some(&"a"));
        // 1 is still the victim.
        core.put(3, "c");
        assert!(!core.contains(&1));
    }

    #[test]
    fn remove_and_pop() {
        let mut core = LruCore::new(3);
        core.put(1, "a");
        core.put(2, "b");
        core.put(3, "c");

        assert_eq!(core.remove(&2), Some("b"));
        assert_eq!(core.remove(&2), None);
        assert_eq!(core.pop_lru(), Some((1, "a")));
        assert_eq!(core.pop_lru(), Some((3, "c")));
        assert_eq!(core.pop_lru(), None);
        core.check_invariants().unwrap();
    }

    #[test]
    fn clear_empties_everything() {
        let mut core = LruCore::new(2);
        core.put(1, "a");
        core.put(2, "b");
        core.clear();
        assert!(core.is_empty());
        assert_eq!(core.get(&1), None);
        core.check_invariants().unwrap();
    }

    #[test]
    fn locked_cache_shares_state_across_clones() {
        let cache = LruCache::new(2);
        let other = cache.clone();
        cache.put(1, "a".to_string());
        assert_eq!(other.get(&1), Some("a".to_string()));
        other.purge();
        assert!(cache.is_empty());
    }
}
