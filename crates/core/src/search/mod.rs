//! Sharded search index: shard sources, the lazy loader and the matcher.

pub mod index;
pub mod matcher;
pub mod source;

pub use index::{DEFAULT_MAX_RESULTS, SearchIndex, Shard};
pub use matcher::{fold, match_tier, rank};
pub use source::{DirShardSource, MemoryShardSource, ShardCatalog};
