//! Deterministic key-to-shard mapping.
//!
//! [`ShardSelector`] hashes a seed and then the key through a
//! `DefaultHasher` and reduces the result modulo the shard count. The same
//! `(key, seed, shards)` tuple always lands on the same shard; different
//! seeds give different (and independent) distributions, which is useful
//! when two striped structures must not collide on the same pathological
//! key set.
//!
//! Used by [`ShardedCache`](crate::sharded::ShardedCache) to pick the
//! per-key shard.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeded, deterministic shard selector.
///
/// # Example
///
/// ```
/// use evictkit::ds::ShardSelector;
///
/// let selector = ShardSelector::new(4, 0);
/// let shard = selector.shard_for_key(&"user:alice");
/// assert!(shard < 4);
/// assert_eq!(selector.shard_for_key(&"user:alice"), shard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector over `shards` shards (clamped to at least 1).
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Number of shards keys are mapped onto.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps `key` to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_deterministic() {
        let selector = ShardSelector::new(8, 123);
        let a = selector.shard_for_key(&"key");
        let b = selector.shard_for_key(&"key");
        assert_eq!(a, b);
        assert!(a < selector.shard_count());
    }

    #[test]
    fn zero_shards_clamps_to_one() {
        let selector = ShardSelector::new(0, 7);
        assert_eq!(selector.shard_count(), 1);
        assert_eq!(selector.shard_for_key(&42u64), 0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Same key always lands on the same shard.
        #[test]
        fn prop_deterministic_mapping(
            shard_count in 1usize..64,
            seed in any::<u64>(),
            key in any::<u32>()
        ) {
            let selector = ShardSelector::new(shard_count, seed);
            prop_assert_eq!(selector.shard_for_key(&key), selector.shard_for_key(&key));
        }

        /// Shard index is always in range.
        #[test]
        fn prop_shard_in_range(
            shard_count in 1usize..128,
            seed in any::<u64>(),
            keys in prop::collection::vec(any::<u64>(), 0..100)
        ) {
            let selector = ShardSelector::new(shard_count, seed);
            for key in keys {
                prop_assert!(selector.shard_for_key(&key) < shard_count);
            }
        }

        /// Enough distinct keys spread over more than one shard.
        #[test]
        fn prop_keys_spread_across_shards(
            shard_count in 2usize..16,
            seed in any::<u64>(),
            keys in prop::collection::hash_set(any::<u32>(), 64..128)
        ) {
            let selector = ShardSelector::new(shard_count, seed);
            let used: std::collections::HashSet<_> =
                keys.iter().map(|k| selector.shard_for_key(k)).collect();
            prop_assert!(used.len() > 1);
        }
    }
}
