//! Striping a cache across independent per-shard policies.
//!
//! [`ShardedCache`] owns N policy instances and routes every operation to
//! `shards[hash(key) % N]`. The wrapper holds no lock of its own — each
//! shard carries its own mutex — so operations on keys that land on
//! different shards proceed in parallel, and throughput scales with N.
//!
//! ## Architecture
//!
//! ```text
//!                         ShardedCache<P>
//!                               │
//!                        ShardSelector
//!                    hash(seed, key) % N
//!          ┌───────────────┬──┴────────────┬───────────────┐
//!          ▼               ▼               ▼               ▼
//!     ┌─────────┐     ┌─────────┐     ┌─────────┐     ┌─────────┐
//!     │ shard 0 │     │ shard 1 │     │ shard 2 │     │ shard 3 │
//!     │  P (own │     │  P (own │     │  P (own │     │  P (own │
//!     │  mutex) │     │  mutex) │     │  mutex) │     │  mutex) │
//!     └─────────┘     └─────────┘     └─────────┘     └─────────┘
//! ```
//!
//! Each shard is sized to `ceil(total_capacity / N)`, so the aggregate
//! capacity can exceed the requested total by up to `N - 1` when N does not
//! divide it. Shards are fully independent: there is no rebalancing, no
//! cross-shard ordering, and a hot shard does not borrow room from a cold
//! one.

use std::hash::Hash;

use crate::ds::shard::ShardSelector;
use crate::traits::CachePolicy;

/// A logical cache striped over N independent policy instances.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::sharded::ShardedCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = ShardedCache::new(100, 4, LruCache::<u64, String>::new);
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// assert_eq!(cache.capacity(), 100); // 4 shards × 25
/// ```
#[derive(Debug)]
pub struct ShardedCache<P> {
    shards: Vec<P>,
    selector: ShardSelector,
}

impl<P> ShardedCache<P> {
    /// Creates `shard_count` shards via `factory`, each sized to
    /// `ceil(total_capacity / shard_count)`.
    ///
    /// A `shard_count` of 0 falls back to the platform concurrency hint.
    pub fn new<F>(total_capacity: usize, shard_count: usize, mut factory: F) -> Self
    where
        F: FnMut(usize) -> P,
    {
        let shard_count = if shard_count == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            shard_count
        };
        let per_shard = total_capacity.div_ceil(shard_count);

        Self {
            shards: (0..shard_count).map(|_| factory(per_shard)).collect(),
            selector: ShardSelector::new(shard_count, 0),
        }
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Direct access to one shard, for tests and diagnostics.
    pub fn shard(&self, index: usize) -> Option<&P> {
        self.shards.get(index)
    }
}

impl<K, V, P> CachePolicy<K, V> for ShardedCache<P>
where
    K: Hash,
    P: CachePolicy<K, V>,
{
    fn get(&self, key: &K) -> Option<V> {
        self.shards[self.selector.shard_for_key(key)].get(key)
    }

    fn put(&self, key: K, value: V) {
        self.shards[self.selector.shard_for_key(&key)].put(key, value);
    }

    fn purge(&self) {
        for shard in &self.shards {
            shard.purge();
        }
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    fn capacity(&self) -> usize {
        self.shards.iter().map(|shard| shard.capacity()).sum()
    }
}
