//! Frequency half of the adaptive cache: LFU buckets with a ghost tail.
//!
//! Holds the entries the coordinator has promoted out of the recency half.
//! A hit moves the entry to the next frequency bucket; eviction takes the
//! least frequent entry (oldest arrival on ties) and remembers its key in
//! the ghost list.
//!
//! ```text
//!   main:  FrequencyBuckets<K> + FxHashMap<K, V>    capacity (mutable)
//!            │ evict front of the lowest bucket
//!            ▼
//!   ghost:  key only, bounded by the capacity this half was built with
//! ```
//!
//! As on the recency side, the ghost capacity never shrinks with the main
//! capacity.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::ds::ghost_list::GhostList;
use crate::error::InvariantError;

/// LFU-side half of the adaptive cache.
#[derive(Debug)]
pub struct FrequencyHalf<K, V> {
    values: FxHashMap<K, V>,
    freqs: FrequencyBuckets<K>,
    ghost: GhostList<K>,
    capacity: usize,
}

impl<K, V> FrequencyHalf<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a half with `capacity` main slots and an equally sized ghost
    /// list.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            freqs: FrequencyBuckets::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.values.len()
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
        self.values.contains_key(key)
    }

    /// Access count of a resident `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.freqs.frequency(key)
    }

    /// Looks up `key`, bumping its frequency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.freqs.touch(key);
        self.values.get(key)
    }

    /// Inserts or overwrites `key` in main.
    ///
    /// Overwrites touch the frequency like a hit; new entries enter at
    /// frequency 1, evicting the least frequent entry into the ghost first
    /// when full.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(slot) = self.values.get_mut(&key) {
            *slot = value;
            self.freqs.touch(&key);
            return;
        }

        if self.values.len() >= self.capacity {
            self.evict_into_ghost();
        }
        self.values.insert(key.clone(), value);
        self.freqs.insert(key);
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
        if self.values.len() >= self.capacity {
            self.evict_into_ghost();
        }
        self.capacity -= 1;
        true
    }

    /// Drops all resident entries and ghost keys.
    pub fn clear(&mut self) {
        self.values.clear();
        self.freqs.clear();
        self.ghost.clear();
    }

    /// Verifies main/ghost bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.values.len() != self.freqs.len() {
            return Err(InvariantError::new(format!(
                "{} values but {} tracked frequencies",
                self.values.len(),
                self.freqs.len()
            )));
        }
        if self.values.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.values.len(),
                self.capacity
            )));
        }
        for key in self.values.keys() {
            if self.freqs.frequency(key).is_none() {
                return Err(InvariantError::new(
                    "resident key missing from frequency buckets",
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
        if let Some((victim, _)) = self.freqs.pop_min() {
            self.values.remove(&victim);
            self.ghost.record(victim);
        }
    }
}
