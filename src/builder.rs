//! Unified builder for all eviction policies.
//!
//! Gives driver code one entry point that yields a single concrete type,
//! [`Cache`], regardless of which policy backs it. This is what lets a
//! benchmark loop or a policy-comparison harness swap policies with a
//! one-line change.
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::{CacheBuilder, PolicyKind};
//! use evictkit::traits::CachePolicy;
//!
//! let cache = CacheBuilder::new(100)
//!     .try_build::<u64, String>(PolicyKind::Lru)
//!     .unwrap();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::arc::{ArcCache, DEFAULT_PROMOTION_THRESHOLD};
use crate::policy::lfu::{LfuCache, DEFAULT_MAX_AVG_NUM};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::{LrukCache, DEFAULT_K};
use crate::traits::CachePolicy;

/// Available eviction policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used eviction.
    Lru,
    /// LRU-K: promotion after `k` read references, tracked in a history
    /// cache of `history_capacity` keys.
    LruK { history_capacity: usize, k: usize },
    /// Least Frequently Used eviction with aging; the average live counter
    /// is kept at or below `max_avg_num`.
    Lfu { max_avg_num: u64 },
    /// Adaptive recency/frequency split with the given promotion threshold.
    Arc { threshold: usize },
}

impl PolicyKind {
    /// LRU-K with the default K of 2.
    pub fn lru_k(history_capacity: usize) -> Self {
        Self::LruK {
            history_capacity,
            k: DEFAULT_K,
        }
    }

    /// LFU with the default aging ceiling (aging effectively off).
    pub fn lfu() -> Self {
        Self::Lfu {
            max_avg_num: DEFAULT_MAX_AVG_NUM,
        }
    }

    /// ARC with the default promotion threshold of 2.
    pub fn arc() -> Self {
        Self::Arc {
            threshold: DEFAULT_PROMOTION_THRESHOLD as usize,
        }
    }
}

/// Uniform cache handle over any concrete policy.
///
/// Construct through [`CacheBuilder`]. The wrapper implements
/// [`CachePolicy`] by delegating to the backing policy.
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    LruK(LrukCache<K, V>),
    Lfu(LfuCache<K, V>),
    Arc(ArcCache<K, V>),
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Lru(cache) => cache.get(key),
            CacheInner::LruK(cache) => cache.get(key),
            CacheInner::Lfu(cache) => cache.get(key),
            CacheInner::Arc(cache) => cache.get(key),
        }
    }

    fn put(&self, key: K, value: V) {
        match &self.inner {
            CacheInner::Lru(cache) => cache.put(key, value),
            CacheInner::LruK(cache) => cache.put(key, value),
            CacheInner::Lfu(cache) => cache.put(key, value),
            CacheInner::Arc(cache) => cache.put(key, value),
        }
    }

    fn purge(&self) {
        match &self.inner {
            CacheInner::Lru(cache) => cache.purge(),
            CacheInner::LruK(cache) => cache.purge(),
            CacheInner::Lfu(cache) => cache.purge(),
            CacheInner::Arc(cache) => cache.purge(),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.len(),
            CacheInner::LruK(cache) => cache.len(),
            CacheInner::Lfu(cache) => cache.len(),
            CacheInner::Arc(cache) => cache.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.capacity(),
            CacheInner::LruK(cache) => cache.capacity(),
            CacheInner::Lfu(cache) => cache.capacity(),
            CacheInner::Arc(cache) => cache.capacity(),
        }
    }
}

/// Builder for cache instances.
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Starts a builder for caches holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds a cache backed by `kind`.
    ///
    /// Returns a [`ConfigError`] for invalid parameters (`k == 0`,
    /// `max_avg_num == 0`, `threshold == 0`).
    pub fn try_build<K, V>(self, kind: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match kind {
            PolicyKind::Lru => CacheInner::Lru(LruCache::new(self.capacity)),
            PolicyKind::LruK {
                history_capacity,
                k,
            } => CacheInner::LruK(LrukCache::try_new(self.capacity, history_capacity, k)?),
            PolicyKind::Lfu { max_avg_num } => {
                CacheInner::Lfu(LfuCache::try_new(self.capacity, max_avg_num)?)
            }
            PolicyKind::Arc { threshold } => {
                CacheInner::Arc(ArcCache::try_new(self.capacity, threshold)?)
            }
        };
        Ok(Cache { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<PolicyKind> {
        vec![
            PolicyKind::Lru,
            PolicyKind::lru_k(16),
            PolicyKind::lfu(),
            PolicyKind::arc(),
        ]
    }

    #[test]
    fn all_policies_share_the_contract() {
        for kind in all_kinds() {
            let cache = CacheBuilder::new(10)
                .try_build::<u64, String>(kind.clone())
                .unwrap();

            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());

            // LRU-K holds first reads back; warm both keys to resident.
            cache.get(&1);
            cache.get(&2);

            assert_eq!(cache.get(&1), Some("one".to_string()), "{kind:?}");
            assert_eq!(cache.get(&2), Some("two".to_string()), "{kind:?}");
            assert_eq!(cache.get(&3), None, "{kind:?}");

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()), "{kind:?}");

            cache.purge();
            assert!(cache.is_empty(), "{kind:?}");
            assert_eq!(cache.get(&1), None, "{kind:?}");
        }
    }

    #[test]
    fn invalid_parameters_fail_at_build_time() {
        assert!(CacheBuilder::new(10)
            .try_build::<u64, u64>(PolicyKind::LruK {
                history_capacity: 10,
                k: 0,
            })
            .is_err());
        assert!(CacheBuilder::new(10)
            .try_build::<u64, u64>(PolicyKind::Lfu { max_avg_num: 0 })
            .is_err());
        assert!(CacheBuilder::new(10)
            .try_build::<u64, u64>(PolicyKind::Arc { threshold: 0 })
            .is_err());
    }

    #[test]
    fn capacity_is_enforced_through_the_wrapper() {
        let cache = CacheBuilder::new(2)
            .try_build::<u64, u64>(PolicyKind::Lru)
            .unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
    }
}
