//! Bounded recency list of recently evicted keys.
//!
//! A ghost list remembers *keys only* — the value is released when an entry
//! falls out of a main cache, and just the key survives here. Adaptive
//! policies ([`arc`](crate::policy::arc)) probe it to detect keys that were
//! evicted too early: a "ghost hit" is the signal that a half is
//! under-provisioned.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>     order: OrderList<K>
//!
//!   front ─► [oldest ghost] ◄──► ... ◄──► [newest ghost] ◄─ back
//!              dropped when full            record() lands here
//! ```
//!
//! Recording an already-present key refreshes it to the newest end. At
//! capacity, the oldest ghost is dropped to make room. A zero-capacity
//! ghost list ignores every record.
//!
//! `take` implements the consume-on-hit contract: membership is checked and
//! removed in one step, so one eviction produces at most one ghost hit.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::order_list::OrderList;
use crate::ds::slot_pool::SlotId;

/// Bounded recency list of keys without values.
#[derive(Debug)]
pub struct GhostList<K> {
    order: OrderList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: OrderList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// The configured capacity. Fixed for the lifetime of the list.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys currently remembered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no keys are remembered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if `key` is remembered, without consuming it.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Remembers `key` as the newest ghost, dropping the oldest if full.
    ///
    /// Re-recording a present key refreshes it to the newest end instead.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_back(id);
            return;
        }

        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.index.remove(&oldest);
            }
        }

        let id = self.order.push_back(key.clone());
        self.index.insert(key, id);
    }

    /// Consumes a ghost hit: removes `key` and reports whether it was there.
    pub fn take(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.order.remove(id);
                true
            }
            None => false,
        }
    }

    /// Forgets all keys.
    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

}

#[cfg(any(test, debug_assertions))]
impl<K> GhostList<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.order.len(), self.index.len());
        assert!(self.order.len() <= self.capacity);
        for (key, &id) in &self.index {
            assert_eq!(self.order.get(id), Some(key));
        }
        self.order.debug_validate_invariants();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_take() {
        let mut ghost = GhostList::new(4);
        ghost.record("a");
        ghost.record("b");
        assert!(ghost.contains(&"a"));
        assert_eq!(ghost.len(), 2);

        assert!(ghost.take(&"a"));
        assert!(!ghost.contains(&"a"));
        assert!(!ghost.take(&"a"), "hit is consumed");
        assert_eq!(ghost.len(), 1);
        ghost.debug_validate_invariants();
    }

    #[test]
    fn overflow_drops_oldest_ghost() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.record("c");

        assert!(!ghost.contains(&"a"));
        assert!(ghost.contains(&"b"));
        assert!(ghost.contains(&"c"));
        assert_eq!(ghost.len(), 2);
    }

    #[test]
    fn rerecording_refreshes_position() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.record("a"); // "a" is now newest
        ghost.record("c"); // evicts "b"

        assert!(ghost.contains(&"a"));
        assert!(!ghost.contains(&"b"));
        assert!(ghost.contains(&"c"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_ignores_records() {
        let mut ghost = GhostList::new(0);
        ghost.record("a");
        assert!(ghost.is_empty());
        assert!(!ghost.take(&"a"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn clear_forgets_everything() {
        let mut ghost = GhostList::new(4);
        ghost.record("a");
        ghost.record("b");
        ghost.clear();
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
        assert_eq!(ghost.capacity(), 4);
    }
}
