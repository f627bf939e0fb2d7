pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::ds::{FrequencyBuckets, GhostList, OrderList, ShardSelector, SlotId, SlotPool};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::arc::ArcCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LrukCache;
pub use crate::sharded::ShardedCache;
pub use crate::traits::CachePolicy;
