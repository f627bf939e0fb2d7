//! Recency half of the adaptive cache: an LRU main list with a ghost tail.
//!
//! Entries enter here on every write. A hit moves the entry to the
//! most-recent end and bumps its access counter; once the counter reaches
//! the promotion threshold the coordinator copies the entry into the
//! frequency half. Evicted keys drop their value and counter and linger in
//! the ghost list so a prompt re-reference can be detected.
//!
//! ```text
//!   main:  front ─► [victim] ◄──► ... ◄─ back        capacity (mutable)
//!            │ evict
//!            ▼
//!   ghost:  key only, bounded by the capacity this half was built with
//! ```
//!
//! The ghost capacity is fixed at construction: capacity transfers shrink
//! the main side but never the ghost, trading a little memory for a longer
//! adaptation signal.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::ghost_list::GhostList;
use crate::ds::order_list::OrderList;
use crate::ds::slot_pool::SlotId;
use crate::error::InvariantError;

#[derive(Debug)]
struct ResidentEntry<V> {
    value: V,
    accesses: u64,
    slot: SlotId,
}

/// LRU-side half of the adaptive cache.
#[derive(Debug)]
pub struct RecencyHalf<K, V> {
    entries: FxHashMap<K, ResidentEntry<V>>,
    order: OrderList<K>,
    ghost: GhostList<K>,
    capacity: usize,
    threshold: u64,
}

impl<K, V> RecencyHalf<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a half with `capacity` main slots, an equally sized ghost
    /// list, and the given promotion threshold.
    pub fn new(capacity: usize, threshold: u64) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: OrderList::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
            threshold,
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Current main capacity (mutated by the coordinator).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of remembered ghost keys.
    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    /// Returns `true` if `key` is resident in main.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up `key`; a hit touches the entry and reports whether this
    /// access raised its counter to the promotion threshold.
    pub fn get(&mut self, key: &K) -> Option<(&V, bool)> {
        let slot = self.entries.get(key)?.slot;
        self.order.move_to_back(slot);

        let entry = self.entries.get_mut(key)?;
        entry.accesses = entry.accesses.saturating_add(1);
        let should_promote = entry.accesses >= self.threshold;
        Some((&entry.value, should_promote))
    }

    /// Inserts or overwrites `key` in main.
    ///
    /// Overwrites touch the entry but leave its counter alone; new entries
    /// start at one access, evicting the least recent entry into the ghost
    /// first when full.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            let slot = entry.slot;
            self.order.move_to_back(slot);
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_into_ghost();
        }
        let slot = self.order.push_back(key.clone());
        self.entries.insert(
            key,
            ResidentEntry {
                value,
                accesses: 1,
                slot,
            },
        );
    }

    /// Consumes a ghost hit for `key`, if any.
    pub fn check_ghost(&mut self, key: &K) -> bool {
        self.ghost.take(key)
    }

    /// Grants this half one more main slot.
    pub fn increase_capacity(&mut self) {
        self.capacity += 1;
    }

    /// Takes one main slot away, evicting an entry first if the half is
    /// full. Refuses (returns `false`) when the capacity is already 0.
    pub fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() >= self.capacity {
            self.evict_into_ghost();
        }
        self.capacity -= 1;
        true
    }

    /// Drops all resident entries and ghost keys.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.ghost.clear();
    }

    /// Verifies main/ghost bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.entries.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "{} entries but {} order nodes",
                self.entries.len(),
                self.order.len()
            )));
        }
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.entries.len(),
                self.capacity
            )));
        }
        for (key, entry) in &self.entries {
            if self.order.get(entry.slot) != Some(key) {
                return Err(InvariantError::new(
                    "entry slot does not resolve to its key",
                ));
            }
            if self.ghost.contains(key) {
                return Err(InvariantError::new(
                    "key resident in both main and ghost",
                ));
            }
        }
        Ok(())
    }

    fn evict_into_ghost(&mut self) {
        if let Some(victim) = self.order.pop_front() {
            self.entries.remove(&victim);
            self.ghost.record(victim);
        }
    }
}
