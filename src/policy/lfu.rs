//! Least Frequently Used (LFU) replacement policy with frequency aging.
//!
//! Every entry carries an access count; eviction takes the entry with the
//! lowest count, breaking ties by arrival order into that count's bucket
//! (a touch moves an entry to the *next* bucket, never around inside one).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                           LfuCore<K, V>                              │
//! │                                                                      │
//! │   values: FxHashMap<K, V>        freqs: FrequencyBuckets<K>          │
//! │                                                                      │
//! │   get/put hit:  freqs.touch(k)   f ──► f+1 (back of next bucket)     │
//! │   put new:      freqs.insert(k)  admitted at f = 1                   │
//! │   evict:        freqs.pop_min()  front of the lowest bucket          │
//! │                                                                      │
//! │   aging:  cur_total_num ── running sum of live counters              │
//! │           cur_avg_num   ── cur_total_num / len after every touch     │
//! │           cur_avg_num > max_avg_num ──► decay_all()                  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aging
//!
//! Without decay, an entry that was hot long ago keeps a saturated counter
//! forever and newer heavy hitters can never push it out. When the average
//! live counter exceeds `max_avg_num`, every entry's frequency drops to
//! `max(1, f - max_avg_num / 2)` in one batch, the running total is
//! adjusted by each delta, and the minimum frequency is recomputed by
//! scanning for the smallest non-empty bucket. Decay runs inside the same
//! critical section as the touch that triggered it, so the ceiling is
//! restored before the operation returns.
//!
//! `max_avg_num` defaults to 1,000,000 (aging effectively off); a small
//! value makes aging aggressive.
//!
//! ## Key Components
//!
//! - [`LfuCore`]: single-threaded core
//! - [`LfuCache`]: `Mutex`-wrapped core implementing
//!   [`CachePolicy`](crate::traits::CachePolicy)

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
use crate::traits::CachePolicy;

/// Default aging ceiling: high enough that decay never fires in practice.
pub const DEFAULT_MAX_AVG_NUM: u64 = 1_000_000;

/// Single-threaded LFU core with frequency aging.
#[derive(Debug)]
pub struct LfuCore<K, V> {
    values: FxHashMap<K, V>,
    freqs: FrequencyBuckets<K>,
    capacity: usize,
    max_avg_num: u64,
    cur_total_num: u64,
    cur_avg_num: u64,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries, with the default
    /// aging ceiling.
    pub fn new(capacity: usize) -> Self {
        Self::try_new(capacity, DEFAULT_MAX_AVG_NUM).expect("default ceiling is always valid")
    }

    /// Creates a core with an explicit aging ceiling.
    ///
    /// Returns a [`ConfigError`] when `max_avg_num` is 0: the average live
    /// counter is at least 1, so a zero ceiling would decay on every touch
    /// without ever lowering anything.
    pub fn try_new(capacity: usize, max_avg_num: u64) -> Result<Self, ConfigError> {
        if max_avg_num == 0 {
            return Err(ConfigError::new("lfu requires max_avg_num >= 1"));
        }
        Ok(Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            freqs: FrequencyBuckets::with_capacity(capacity),
            capacity,
            max_avg_num,
            cur_total_num: 0,
            cur_avg_num: 0,
        })
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `key` is resident, without touching it.
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Access count of a resident `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.freqs.frequency(key)
    }

    /// The current eviction victim, without touching it.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let (key, _) = self.freqs.peek_min()?;
        let value = self.values.get(key)?;
        Some((key, value))
    }

    /// Looks up `key`, bumping its frequency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.touch_resident(key);
        self.values.get(key)
    }

    /// Inserts or overwrites `key`.
    ///
    /// An existing key is overwritten and touched exactly like a hit. A new
    /// key evicts the least frequent entry first when full, then enters at
    /// frequency 1.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(slot) = self.values.get_mut(&key) {
            *slot = value;
            self.touch_resident(&key);
            return;
        }

        if self.values.len() >= self.capacity {
            self.evict_lfu();
        }
        self.values.insert(key.clone(), value);
        self.freqs.insert(key);
        self.account_touch();
    }

    /// Evicts and returns the least frequent entry (oldest on ties).
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let (key, freq) = self.freqs.pop_min()?;
        let value = self.values.remove(&key);
        self.cur_total_num = self.cur_total_num.saturating_sub(freq);
        self.recompute_avg();
        // Dropping a low-frequency entry can raise the average past the
        // ceiling; restore it before returning.
        self.restore_ceiling();
        value.map(|value| (key, value))
    }

    /// Drops every entry and resets the aging counters.
    pub fn clear(&mut self) {
        self.values.clear();
        self.freqs.clear();
        self.cur_total_num = 0;
        self.cur_avg_num = 0;
    }

    /// Verifies that values, frequency buckets, and the aging accounting
    /// agree.
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
        }
        if self.cur_avg_num > self.max_avg_num {
            return Err(InvariantError::new(format!(
                "average counter {} left above ceiling {}",
                self.cur_avg_num, self.max_avg_num
            )));
        }
        let live_total: u64 = self.freqs.entries().map(|(_, f)| f).sum();
        if live_total != self.cur_total_num {
            return Err(InvariantError::new(format!(
                "running total {} does not match live counters {}",
                self.cur_total_num, live_total
            )));
        }
        Ok(())
    }

    fn touch_resident(&mut self, key: &K) {
        self.freqs.touch(key);
        self.account_touch();
    }

    fn evict_lfu(&mut self) {
        if let Some((victim, freq)) = self.freqs.pop_min() {
            self.values.remove(&victim);
            self.cur_total_num = self.cur_total_num.saturating_sub(freq);
            self.recompute_avg();
        }
    }

    /// Bumps the aging counters after a touch or admission and decays the
    /// whole cache if the average crossed the ceiling.
    fn account_touch(&mut self) {
        self.cur_total_num += 1;
        self.recompute_avg();
        self.restore_ceiling();
    }

    /// Decays until the average is back at or below the ceiling. One pass
    /// almost always suffices; evictions of cold entries can leave the
    /// average more than one decay step above the ceiling.
    fn restore_ceiling(&mut self) {
        while self.cur_avg_num > self.max_avg_num {
            self.decay_all();
        }
    }

    fn recompute_avg(&mut self) {
        self.cur_avg_num = if self.values.is_empty() {
            0
        } else {
            self.cur_total_num / self.values.len() as u64
        };
    }

    /// Halves the working ceiling off every counter so newer heavy hitters
    /// can reach the minimum bucket.
    fn decay_all(&mut self) {
        // Clamped so a ceiling of 1 still makes progress.
        let decay = (self.max_avg_num / 2).max(1);
        let snapshot: Vec<(K, u64)> = self
            .freqs
            .entries()
            .map(|(key, freq)| (key.clone(), freq))
            .collect();

        for (key, old_freq) in snapshot {
            let new_freq = old_freq.saturating_sub(decay).max(1);
            self.freqs.set_frequency(&key, new_freq);
            self.cur_total_num -= old_freq - new_freq;
        }
        self.recompute_avg();
    }
}

// ---------------------------------------------------------------------------
// Thread-safe wrapper
// ---------------------------------------------------------------------------

/// Thread-safe LFU cache: an [`LfuCore`] behind one mutex.
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = LfuCache::new(2);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.get(&1);
/// cache.get(&1);
/// cache.put(3, "c"); // evicts 2 (frequency 1 < 3)
///
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("a"));
/// ```
#[derive(Clone)]
pub struct LfuCache<K, V> {
    inner: Arc<Mutex<LfuCore<K, V>>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the default aging ceiling.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LfuCore::new(capacity))),
        }
    }

    /// Creates a cache with an explicit aging ceiling; 0 is a
    /// [`ConfigError`].
    pub fn try_new(capacity: usize, max_avg_num: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(LfuCore::try_new(capacity, max_avg_num)?)),
        })
    }

    /// Returns `true` if `key` is resident, without touching it.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Access count of a resident `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    /// Runs `f` under the cache lock with direct core access.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut LfuCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
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

impl<K, V> std::fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LfuCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
