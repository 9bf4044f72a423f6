pub mod config;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod navtree;
pub mod reader;
pub mod search;
pub mod site;

pub use config::DocscopeConfig;
pub use error::{DocscopeError, Result};
pub use hierarchy::HierarchyDag;
pub use navtree::NavTree;
pub use search::{DirShardSource, MemoryShardSource, SearchIndex};
pub use site::Site;
