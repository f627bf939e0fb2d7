//! LRU-K replacement policy: admission gated on K references.
//!
//! A key does not enter the resident ("promoted") cache on first contact.
//! Instead its reference count warms up in a bounded history cache, and a
//! candidate value waits in a side map. Only once the key has been read K
//! times is it promoted into an embedded LRU. One-shot scans therefore
//! never displace resident entries.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          LrukCore<K, V>                              │
//! │                                                                      │
//! │   promoted: LruCore<K, V>        capacity C — resident entries       │
//! │   history:  LruCore<K, u64>      capacity H — reference counts       │
//! │   candidates: FxHashMap<K, V>    values waiting for promotion        │
//! │                                                                      │
//! │   get(k):  promoted hit ──────────────► LRU touch, return value      │
//! │            miss ──► history[k] += 1                                  │
//! │                     count ≥ K and candidate present?                 │
//! │                        yes ─► promote, return candidate              │
//! │                        no ──► miss                                   │
//! │                                                                      │
//! │   put(k,v): promoted hit ─────────────► overwrite there              │
//! │             miss ──► candidates[k] = v                               │
//! │                      count already ≥ K? ─► promote immediately       │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reference counts track *reads*: a `get` miss on a tracked key increments
//! its count, while `put` only records the candidate value. A pure reader
//! path (K gets without any put) never promotes — there is no candidate to
//! promote, so the gets stay misses. This keeps promotion from ever
//! manufacturing a value out of thin air.
//!
//! The history cache is itself an LRU: under unbounded unique-key traffic
//! the oldest warming keys fall out, and their candidate values are dropped
//! with them, so memory stays bounded by C + H.
//!
//! ## Key Components
//!
//! - [`LrukCore`]: single-threaded core (promoted LRU + history LRU + side map)
//! - [`LrukCache`]: `Mutex`-wrapped core implementing
//!   [`CachePolicy`](crate::traits::CachePolicy)

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{ConfigError, InvariantError};
use crate::policy::lru::LruCore;
use crate::traits::CachePolicy;

/// Default reference threshold: two touches before promotion.
pub const DEFAULT_K: usize = 2;

/// Single-threaded LRU-K core.
///
/// Composes an embedded promoted LRU with a history LRU of reference counts
/// and a candidate side map; see the module docs for the promotion rules.
#[derive(Debug)]
pub struct LrukCore<K, V> {
    promoted: LruCore<K, V>,
    history: LruCore<K, u64>,
    candidates: FxHashMap<K, V>,
    k: u64,
}

impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with `capacity` resident slots, `history_capacity`
    /// tracked warming keys, and the default K of 2.
    pub fn new(capacity: usize, history_capacity: usize) -> Self {
        Self::try_new(capacity, history_capacity, DEFAULT_K)
            .expect("default K is always valid")
    }

    /// Creates a core with an explicit K.
    ///
    /// Returns a [`ConfigError`] when `k` is 0: a promotion threshold below
    /// one reference is meaningless.
    pub fn try_new(capacity: usize, history_capacity: usize, k: usize) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::new("lru-k requires k >= 1"));
        }
        Ok(Self {
            promoted: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            candidates: FxHashMap::default(),
            k: k as u64,
        })
    }

    /// Number of promoted (resident) entries.
    pub fn len(&self) -> usize {
        self.promoted.len()
    }

    /// Returns `true` if nothing is promoted.
    pub fn is_empty(&self) -> bool {
        self.promoted.is_empty()
    }

    /// Capacity of the promoted cache.
    pub fn capacity(&self) -> usize {
        self.promoted.capacity()
    }

    /// Capacity of the history cache.
    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// The configured reference threshold.
    pub fn k(&self) -> usize {
        self.k as usize
    }

    /// Returns `true` if `key` is promoted (resident).
    pub fn contains(&self, key: &K) -> bool {
        self.promoted.contains(key)
    }

    /// Number of read references recorded for a non-promoted `key`.
    pub fn reference_count(&self, key: &K) -> Option<u64> {
        self.history.peek(key).copied()
    }

    /// Looks up `key`.
    ///
    /// A promoted hit touches the embedded LRU. A miss increments the key's
    /// reference count and, when the count has reached K and a candidate
    /// value is waiting, promotes the key and returns that value.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.promoted.contains(key) {
            return self.promoted.get(key);
        }

        let count = self.bump_reference(key);
        if count >= self.k && self.candidates.contains_key(key) {
            self.promote(key);
            return self.promoted.get(key);
        }
        None
    }

    /// Inserts or overwrites `key`.
    ///
    /// A promoted key is overwritten in place. Otherwise the value becomes
    /// the key's promotion candidate (replacing any earlier one); if the
    /// accumulated read count has already reached K, promotion happens now.
    pub fn put(&mut self, key: K, value: V) {
        if self.promoted.contains(&key) {
            self.promoted.put(key, value);
            return;
        }

        // An untracked candidate would be unreclaimable, so only keys the
        // history can track may wait for promotion.
        if self.history.capacity() == 0 {
            return;
        }
        if !self.history.contains(&key) {
            self.reserve_history_slot();
            self.history.put(key.clone(), 0);
        }
        self.candidates.insert(key.clone(), value);

        // Touch the history entry so actively written keys stay tracked.
        let count = self.history.get(&key).copied().unwrap_or(0);
        if count >= self.k {
            self.promote(&key);
        }
    }

    /// Drops everything: promoted entries, history, and candidates.
    pub fn clear(&mut self) {
        self.promoted.clear();
        self.history.clear();
        self.candidates.clear();
    }

    /// Verifies cross-structure bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.promoted.check_invariants()?;
        self.history.check_invariants()?;
        for key in self.candidates.keys() {
            if !self.history.contains(key) {
                return Err(InvariantError::new(
                    "candidate value for a key the history no longer tracks",
                ));
            }
            if self.promoted.contains(key) {
                return Err(InvariantError::new(
                    "key is both promoted and waiting as a candidate",
                ));
            }
        }
        Ok(())
    }

    fn bump_reference(&mut self, key: &K) -> u64 {
        let current = self.history.get(key).copied();
        let next = match current {
            Some(count) => count.saturating_add(1),
            None => {
                self.reserve_history_slot();
                1
            }
        };
        self.history.put(key.clone(), next);
        next
    }

    /// Makes room for one new history entry, dropping the stalest warming
    /// key and its candidate together.
    fn reserve_history_slot(&mut self) {
        if self.history.capacity() > 0 && self.history.len() >= self.history.capacity() {
            if let Some((stale, _)) = self.history.pop_lru() {
                self.candidates.remove(&stale);
            }
        }
    }

    fn promote(&mut self, key: &K) {
        if let Some(value) = self.candidates.remove(key) {
            self.promoted.put(key.clone(), value);
            self.history.remove(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Thread-safe wrapper
// ---------------------------------------------------------------------------

/// Thread-safe LRU-K cache: an [`LrukCore`] behind one mutex.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru_k::LrukCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = LrukCache::new(2, 10); // K = 2
/// cache.put(1, "a");
/// assert_eq!(cache.get(&1), None);      // first read: still warming
/// assert_eq!(cache.get(&1), Some("a")); // second read: promoted
/// ```
#[derive(Clone)]
pub struct LrukCache<K, V> {
    inner: Arc<Mutex<LrukCore<K, V>>>,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the default K of 2.
    pub fn new(capacity: usize, history_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LrukCore::new(capacity, history_capacity))),
        }
    }

    /// Creates a cache with an explicit K; `k == 0` is a [`ConfigError`].
    pub fn try_new(
        capacity: usize,
        history_capacity: usize,
        k: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(LrukCore::try_new(capacity, history_capacity, k)?)),
        })
    }

    /// Returns `true` if `key` is promoted (resident).
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Runs `f` under the cache lock with direct core access.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut LrukCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> CachePolicy<K, V> for LrukCache<K, V>
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

impl<K, V> std::fmt::Debug for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LrukCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .field("k", &core.k())
            .finish_non_exhaustive()
    }
}
