//! Adaptive Replacement Cache (ARC) built from two cooperating halves.
//!
//! The cache splits into a recency half (LRU-ordered, where every write
//! lands) and a frequency half (LFU-ordered, where entries graduate once
//! their access count reaches the promotion threshold). Each half trails a
//! ghost list of recently evicted keys. Re-referencing a ghost key is the
//! adaptation signal: that half was under-provisioned, so one unit of
//! capacity moves towards it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                            ArcCore<K, V>                             │
//! │                                                                      │
//! │   RecencyHalf (LRU)                  FrequencyHalf (LFU)             │
//! │   ┌──────────────────────┐           ┌──────────────────────┐        │
//! │   │ main: order + counts │  promote  │ main: freq buckets   │        │
//! │   │ every put lands here │ ────────► │ counter ≥ threshold  │        │
//! │   └──────────┬───────────┘           └──────────┬───────────┘        │
//! │              │ evict                            │ evict              │
//! │              ▼                                  ▼                    │
//! │   ┌──────────────────────┐           ┌──────────────────────┐        │
//! │   │ ghost (keys only)    │           │ ghost (keys only)    │        │
//! │   └──────────┬───────────┘           └──────────┬───────────┘        │
//! │              │ ghost hit                        │ ghost hit          │
//! │              ▼                                  ▼                    │
//! │     frequency.decrease_capacity()      recency.decrease_capacity()   │
//! │     + recency.increase_capacity()      + frequency.increase_capacity()
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Flow
//!
//! Every `get`/`put` first probes the ghosts (consuming at most one hit and
//! performing at most one capacity transfer), then:
//!
//! - `get`: recency hit → touch; if the counter reached the threshold the
//!   value is copied into the frequency half too, and the hit is returned
//!   either way. Recency miss → try the frequency half.
//! - `put`: always written to the recency half; if the frequency half
//!   already held the key it is overwritten there as well, keeping the two
//!   views of a promoted key coherent.
//!
//! The transfer is strictly local — one unit per ghost hit, no learning
//! rate, bounded by the donor half refusing at capacity 0.
//!
//! ## Key Components
//!
//! - [`RecencyHalf`] / [`FrequencyHalf`]: the two sub-caches
//! - [`ArcCore`]: single-threaded coordinator
//! - [`ArcCache`]: `Mutex`-wrapped core implementing
//!   [`CachePolicy`](crate::traits::CachePolicy)
//!
//! ## References
//!
//! - Megiddo & Modha, "ARC: A Self-Tuning, Low Overhead Replacement
//!   Cache", FAST 2003 (the ghost-driven adaptation; the split here uses
//!   two independently sized halves rather than a single target parameter)

pub mod frequency;
pub mod recency;

use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

pub use frequency::FrequencyHalf;
pub use recency::RecencyHalf;

use crate::error::{ConfigError, InvariantError};
use crate::traits::CachePolicy;

/// Default promotion threshold: the second access graduates an entry.
pub const DEFAULT_PROMOTION_THRESHOLD: u64 = 2;

/// Single-threaded ARC coordinator over the two halves.
#[derive(Debug)]
pub struct ArcCore<K, V> {
    recency: RecencyHalf<K, V>,
    frequency: FrequencyHalf<K, V>,
    capacity: usize,
    threshold: u64,
}

impl<K, V> ArcCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a coordinator whose halves each start with `capacity` main
    /// slots, using the default promotion threshold.
    pub fn new(capacity: usize) -> Self {
        Self::try_new(capacity, DEFAULT_PROMOTION_THRESHOLD as usize)
            .expect("default threshold is always valid")
    }

    /// Creates a coordinator with an explicit promotion threshold.
    ///
    /// Returns a [`ConfigError`] when `threshold` is 0: every entry would
    /// qualify for promotion before its first access.
    pub fn try_new(capacity: usize, threshold: usize) -> Result<Self, ConfigError> {
        if threshold == 0 {
            return Err(ConfigError::new("arc requires promotion threshold >= 1"));
        }
        Ok(Self {
            recency: RecencyHalf::new(capacity, threshold as u64),
            frequency: FrequencyHalf::new(capacity),
            capacity,
            threshold: threshold as u64,
        })
    }

    /// Entries held across both halves. A promoted key that is still
    /// resident on the recency side counts once per half.
    pub fn len(&self) -> usize {
        self.recency.len() + self.frequency.len()
    }

    /// Returns `true` if both halves are empty.
    pub fn is_empty(&self) -> bool {
        self.recency.len() == 0 && self.frequency.len() == 0
    }

    /// The per-half capacity this cache was constructed with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current recency-half capacity (moves with ghost hits).
    pub fn recency_capacity(&self) -> usize {
        self.recency.capacity()
    }

    /// Current frequency-half capacity (moves with ghost hits).
    pub fn frequency_capacity(&self) -> usize {
        self.frequency.capacity()
    }

    /// Returns `true` if `key` is resident in either half.
    pub fn contains(&self, key: &K) -> bool {
        self.recency.contains(key) || self.frequency.contains(key)
    }

    /// Looks up `key`.
    ///
    /// Probes the ghosts first (adapting the split on a ghost hit), then
    /// the recency half — promoting into the frequency half when the access
    /// counter reaches the threshold — and finally the frequency half.
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.check_ghosts(key);

        if let Some((value, should_promote)) = self.recency.get(key) {
            let value = value.clone();
            if should_promote {
                self.frequency.put(key.clone(), value.clone());
            }
            return Some(value);
        }

        self.frequency.get(key).cloned()
    }

    /// Inserts or overwrites `key`.
    ///
    /// Probes the ghosts first, then always writes to the recency half; a
    /// key the frequency half already holds is overwritten there too.
    pub fn put(&mut self, key: K, value: V) {
        self.check_ghosts(&key);

        let promoted = self.frequency.contains(&key);
        self.recency.put(key.clone(), value.clone());
        if promoted {
            self.frequency.put(key, value);
        }
    }

    /// Drops every entry and ghost key and restores the constructed split.
    ///
    /// The adaptation state is part of what purge resets: both halves go
    /// back to the capacity the cache was built with.
    pub fn clear(&mut self) {
        self.recency = RecencyHalf::new(self.capacity, self.threshold);
        self.frequency = FrequencyHalf::new(self.capacity);
    }

    /// Verifies both halves.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.recency.check_invariants()?;
        self.frequency.check_invariants()?;
        Ok(())
    }

    /// Probes both ghosts for `key`, consuming at most one hit and moving
    /// at most one unit of capacity towards the half that lost the key too
    /// early.
    fn check_ghosts(&mut self, key: &K) -> bool {
        if self.recency.check_ghost(key) {
            if self.frequency.decrease_capacity() {
                self.recency.increase_capacity();
            }
            true
        } else if self.frequency.check_ghost(key) {
            if self.recency.decrease_capacity() {
                self.frequency.increase_capacity();
            }
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Thread-safe wrapper
// ---------------------------------------------------------------------------

/// Thread-safe adaptive cache: an [`ArcCore`] behind one mutex.
///
/// # Example
///
/// ```
/// use evictkit::policy::arc::ArcCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = ArcCache::new(2);
/// cache.put(1, "a");
/// cache.get(&1); // second access: promoted to the frequency half
/// cache.put(2, "b");
/// cache.put(3, "c"); // recency pressure cannot push out the hot key
///
/// assert_eq!(cache.get(&1), Some("a"));
/// ```
#[derive(Clone)]
pub struct ArcCache<K, V> {
    inner: Arc<Mutex<ArcCore<K, V>>>,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache with the default promotion threshold of 2.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ArcCore::new(capacity))),
        }
    }

    /// Creates a cache with an explicit promotion threshold; 0 is a
    /// [`ConfigError`].
    pub fn try_new(capacity: usize, threshold: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(ArcCore::try_new(capacity, threshold)?)),
        })
    }

    /// Returns `true` if `key` is resident in either half.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Runs `f` under the cache lock with direct core access.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut ArcCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> CachePolicy<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
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

impl<K, V> std::fmt::Debug for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("ArcCache")
            .field("recency_capacity", &core.recency_capacity())
            .field("frequency_capacity", &core.frequency_capacity())
            .field("len", &core.len())
            .finish_non_exhaustive()
    }
}
