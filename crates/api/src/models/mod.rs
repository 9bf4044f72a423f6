pub mod hierarchy;
pub mod nav;
pub mod search;

pub use hierarchy::{HierarchyEdge, HierarchyNode, HierarchyRow, NodeRef};
pub use nav::{NavNode, NavRow, NavState, NodePath};
pub use search::{
    BucketKey, EntryKind, MatchTier, QueryResponse, SearchEntry, SearchOutcome, Target,
};
