//! Frequency-ordered buckets for LFU-style policies.
//!
//! Tracks one access counter per key and groups keys with equal counts into
//! insertion-ordered buckets. Eviction takes the front of the lowest
//! non-empty bucket, which yields "least frequent, oldest arrival first"
//! without any per-operation scan.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  index: FxHashMap<K, SlotId>      links: SlotPool<Link<K>>         │
//! │                                                                    │
//! │  buckets: FxHashMap<u64, Bucket>                                   │
//! │                                                                    │
//! │   freq=1   front ─► [d] ◄──► [e]            ◄─ back                │
//! │   freq=3   front ─► [a]                     ◄─ back                │
//! │   freq=7   front ─► [b] ◄──► [c]            ◄─ back                │
//! │            ▲                    ▲                                  │
//! │            │                    └ most recently promoted           │
//! │            └ evicted first on frequency ties                       │
//! │                                                                    │
//! │   min_freq = 1  (smallest non-empty bucket; 0 when empty)          │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A touch moves a key from `buckets[f]` to the back of `buckets[f+1]`; a
//! key never changes position *within* a bucket, so the tie-break among
//! equal counts is arrival order into that bucket, not most-recent touch.
//! Empty buckets are unlinked before any operation returns, and `min_freq`
//! always names the smallest non-empty bucket.
//!
//! ## Operations
//!
//! | Operation       | Description                              | Complexity  |
//! |-----------------|------------------------------------------|-------------|
//! | `insert`        | Admit a key at frequency 1               | O(1) avg    |
//! | `touch`         | Promote a key to the next bucket         | O(1) avg    |
//! | `pop_min`       | Evict front of the lowest bucket         | O(1) avg*   |
//! | `set_frequency` | Re-bucket a key (frequency decay)        | O(B)        |
//! | `remove`        | Drop a key                               | O(B)        |
//!
//! \* amortized; dropping the last entry of the lowest bucket rescans the
//! bucket map (O(B) over B distinct frequencies), as does `set_frequency`.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::slot_pool::{SlotId, SlotPool};

#[derive(Debug)]
struct Link<K> {
    key: K,
    freq: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

/// Per-key access counters with bucket ordering; the fundamental block of
/// the LFU side of this crate.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    links: SlotPool<Link<K>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    /// Smallest non-empty frequency, 0 when no keys are tracked.
    min_freq: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self {
            links: SlotPool::new(),
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Creates an empty structure with space reserved for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: SlotPool::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns `true` if `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the access count of `key`, if tracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.links.get(id).map(|link| link.freq)
    }

    /// The smallest non-empty frequency, or `None` when empty.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// The current eviction victim: front of the lowest bucket.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let id = self.buckets.get(&self.min_freq)?.head?;
        let link = self.links.get(id)?;
        Some((&link.key, link.freq))
    }

    /// Iterates over `(key, frequency)` pairs in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, u64)> {
        self.links.iter().map(|(_, link)| (&link.key, link.freq))
    }

    /// Admits `key` at frequency 1. Returns `false` if it was already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let id = self.links.insert(Link {
            key: key.clone(),
            freq: 1,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);

        let bucket = self.buckets.entry(1).or_default();
        Self::bucket_push_back(&mut self.links, bucket, id);

        if self.min_freq == 0 || self.min_freq > 1 {
            self.min_freq = 1;
        }
        true
    }

    /// Promotes `key` to the next frequency bucket; returns the new count.
    ///
    /// A saturated counter (`u64::MAX`) stays put, only refreshing its
    /// position at the back of its bucket.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let freq = self.links.get(id)?.freq;

        if freq == u64::MAX {
            let bucket = self.buckets.get_mut(&freq)?;
            Self::bucket_unlink(&mut self.links, bucket, id);
            Self::bucket_push_back(&mut self.links, bucket, id);
            return Some(freq);
        }

        let next = freq + 1;
        let emptied = self.unlink_from_bucket(freq, id);

        if let Some(link) = self.links.get_mut(id) {
            link.freq = next;
        }
        let bucket = self.buckets.entry(next).or_default();
        Self::bucket_push_back(&mut self.links, bucket, id);

        // A promotion out of the lowest bucket that drained it makes f+1 the
        // new smallest non-empty bucket; nothing can exist in between.
        if emptied && self.min_freq == freq {
            self.min_freq = next;
        }

        Some(next)
    }

    /// Re-buckets `key` at `new_freq` (clamped to at least 1), placing it at
    /// the back of the target bucket. Returns the previous count.
    ///
    /// This is the bulk re-bucketing primitive behind frequency decay.
    pub fn set_frequency(&mut self, key: &K, new_freq: u64) -> Option<u64> {
        let id = *self.index.get(key)?;
        let old = self.links.get(id)?.freq;
        let new_freq = new_freq.max(1);

        let emptied = self.unlink_from_bucket(old, id);
        if let Some(link) = self.links.get_mut(id) {
            link.freq = new_freq;
        }
        let bucket = self.buckets.entry(new_freq).or_default();
        Self::bucket_push_back(&mut self.links, bucket, id);

        if self.min_freq == 0 || new_freq < self.min_freq {
            self.min_freq = new_freq;
        } else if emptied && old == self.min_freq {
            self.rescan_min();
        }

        Some(old)
    }

    /// Drops `key`; returns its final count.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let id = self.index.remove(key)?;
        let freq = self.links.get(id)?.freq;

        let emptied = self.unlink_from_bucket(freq, id);
        self.links.remove(id);

        if emptied && freq == self.min_freq {
            self.rescan_min();
        }
        Some(freq)
    }

    /// Evicts and returns the front of the lowest bucket.
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let freq = self.min_freq;
        let id = self.buckets.get(&freq)?.head?;

        let emptied = self.unlink_from_bucket(freq, id);
        let link = self.links.remove(id)?;
        self.index.remove(&link.key);

        if emptied {
            self.rescan_min();
        }
        Some((link.key, link.freq))
    }

    /// Drops all keys and buckets.
    pub fn clear(&mut self) {
        self.links.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    /// Unlinks `id` from `buckets[freq]`; removes the bucket if it drained.
    /// Returns `true` if the bucket was removed.
    fn unlink_from_bucket(&mut self, freq: u64, id: SlotId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return false;
        };
        Self::bucket_unlink(&mut self.links, bucket, id);
        if bucket.head.is_none() {
            self.buckets.remove(&freq);
            true
        } else {
            false
        }
    }

    fn rescan_min(&mut self) {
        self.min_freq = self.buckets.keys().copied().min().unwrap_or(0);
    }

    fn bucket_push_back(links: &mut SlotPool<Link<K>>, bucket: &mut Bucket, id: SlotId) {
        let old_tail = bucket.tail;
        if let Some(link) = links.get_mut(id) {
            link.prev = old_tail;
            link.next = None;
        }
        match old_tail {
            Some(tail_id) => {
                if let Some(link) = links.get_mut(tail_id) {
                    link.next = Some(id);
                }
            }
            None => bucket.head = Some(id),
        }
        bucket.tail = Some(id);
    }

    fn bucket_unlink(links: &mut SlotPool<Link<K>>, bucket: &mut Bucket, id: SlotId) {
        let (prev, next) = match links.get(id) {
            Some(link) => (link.prev, link.next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(link) = links.get_mut(prev_id) {
                    link.next = next;
                }
            }
            None => bucket.head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(link) = links.get_mut(next_id) {
                    link.prev = prev;
                }
            }
            None => bucket.tail = prev,
        }

        if let Some(link) = links.get_mut(id) {
            link.prev = None;
            link.next = None;
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.len(), self.index.len());

        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }

        assert!(self.min_freq > 0);
        assert_eq!(
            self.min_freq,
            self.buckets.keys().copied().min().unwrap_or(0),
            "min_freq must name the smallest non-empty bucket"
        );

        let mut walked = 0usize;
        for (&freq, bucket) in &self.buckets {
            assert!(bucket.head.is_some(), "empty bucket left in map");

            let mut prev = None;
            let mut cursor = bucket.head;
            while let Some(id) = cursor {
                let link = self.links.get(id).expect("bucket link missing");
                assert_eq!(link.freq, freq);
                assert_eq!(link.prev, prev);
                assert_eq!(self.index.get(&link.key), Some(&id));
                prev = Some(id);
                cursor = link.next;
                walked += 1;
                assert!(walked <= self.len(), "cycle in bucket chain");
            }
            assert_eq!(bucket.tail, prev);
        }
        assert_eq!(walked, self.len());
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_touch_pop_flow() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert("a"));
        assert!(buckets.insert("b"));

        assert_eq!(buckets.frequency(&"a"), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));

        assert_eq!(buckets.touch(&"a"), Some(2));
        assert_eq!(buckets.min_freq(), Some(1));

        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.min_freq(), Some(2));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert("a"));
        assert!(!buckets.insert("a"));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.frequency(&"a"), Some(1));
    }

    #[test]
    fn touch_missing_returns_none() {
        let mut buckets: FrequencyBuckets<&str> = FrequencyBuckets::new();
        assert_eq!(buckets.touch(&"missing"), None);
        assert!(buckets.is_empty());
        assert_eq!(buckets.min_freq(), None);
    }

    #[test]
    fn ties_break_by_arrival_order_into_bucket() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.insert("c");

        // Promote all three to frequency 2 in the order c, a, b.
        buckets.touch(&"c");
        buckets.touch(&"a");
        buckets.touch(&"b");

        assert_eq!(buckets.pop_min(), Some(("c", 2)));
        assert_eq!(buckets.pop_min(), Some(("a", 2)));
        assert_eq!(buckets.pop_min(), Some(("b", 2)));
        assert!(buckets.is_empty());
    }

    #[test]
    fn min_freq_advances_when_lowest_bucket_drains() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("only");
        assert_eq!(buckets.touch(&"only"), Some(2));
        assert_eq!(buckets.min_freq(), Some(2));
        assert_eq!(buckets.touch(&"only"), Some(3));
        assert_eq!(buckets.min_freq(), Some(3));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn remove_updates_min_freq() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.touch(&"b");

        assert_eq!(buckets.remove(&"a"), Some(1));
        assert_eq!(buckets.min_freq(), Some(2));
        assert!(!buckets.contains(&"a"));

        assert_eq!(buckets.remove(&"b"), Some(2));
        assert_eq!(buckets.min_freq(), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn set_frequency_rebuckets_and_retunes_min() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        for _ in 0..6 {
            buckets.touch(&"a");
        }
        assert_eq!(buckets.frequency(&"a"), Some(7));
        assert_eq!(buckets.min_freq(), Some(1));

        // Decay the hot key below the cold one.
        assert_eq!(buckets.set_frequency(&"a", 0), Some(7));
        assert_eq!(buckets.frequency(&"a"), Some(1), "clamped to at least 1");

        // Raise the cold key; min must follow the remaining lowest bucket.
        assert_eq!(buckets.set_frequency(&"b", 5), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));
        assert_eq!(buckets.peek_min(), Some((&"a", 1)));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn set_frequency_moves_key_to_bucket_back() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        // Re-bucketing "a" at its own frequency sends it behind "b".
        buckets.set_frequency(&"a", 1);
        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.pop_min(), Some(("a", 1)));
    }

    #[test]
    fn pop_min_on_empty() {
        let mut buckets: FrequencyBuckets<&str> = FrequencyBuckets::new();
        assert_eq!(buckets.pop_min(), None);
        assert_eq!(buckets.peek_min(), None);
    }

    #[test]
    fn peek_min_does_not_remove() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        assert_eq!(buckets.peek_min(), Some((&"a", 1)));
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn clear_resets_state() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.touch(&"a");
        buckets.clear();
        assert!(buckets.is_empty());
        assert_eq!(buckets.min_freq(), None);
        assert_eq!(buckets.pop_min(), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn saturated_counter_stays_in_place() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.set_frequency(&"a", u64::MAX);
        assert_eq!(buckets.touch(&"a"), Some(u64::MAX));
        assert_eq!(buckets.frequency(&"a"), Some(u64::MAX));
        buckets.debug_validate_invariants();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8),
        Touch(u8),
        Remove(u8),
        PopMin,
        SetFreq(u8, u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::Insert),
            any::<u8>().prop_map(Op::Touch),
            any::<u8>().prop_map(Op::Remove),
            Just(Op::PopMin),
            (any::<u8>(), 0u64..32).prop_map(|(k, f)| Op::SetFreq(k, f)),
        ]
    }

    proptest! {
        /// Invariants hold under arbitrary operation interleavings.
        #[test]
        fn prop_arbitrary_ops_keep_invariants(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut buckets = FrequencyBuckets::new();
            for op in ops {
                match op {
                    Op::Insert(k) => { buckets.insert(k); },
                    Op::Touch(k) => { buckets.touch(&k); },
                    Op::Remove(k) => { buckets.remove(&k); },
                    Op::PopMin => { buckets.pop_min(); },
                    Op::SetFreq(k, f) => { buckets.set_frequency(&k, f); },
                }
                buckets.debug_validate_invariants();
            }
        }

        /// pop_min always returns the smallest frequency currently tracked.
        #[test]
        fn prop_pop_min_is_minimal(
            keys in prop::collection::hash_set(any::<u16>(), 1..40),
            touches in prop::collection::vec(any::<u16>(), 0..200)
        ) {
            let mut buckets = FrequencyBuckets::new();
            for key in &keys {
                buckets.insert(*key);
            }
            for key in touches {
                buckets.touch(&key);
            }

            let expected_min = buckets.entries().map(|(_, f)| f).min().unwrap();
            let (_, freq) = buckets.pop_min().unwrap();
            prop_assert_eq!(freq, expected_min);
        }
    }
}
