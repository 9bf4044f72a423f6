pub mod diagnostics;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod navigation;
pub mod search;

// Re-export commonly used types
pub use diagnostics::{Diagnostic, ShardError};
pub use error::{ApiError, ApiResult};
pub use hierarchy::HierarchyService;
pub use models::*;
pub use navigation::NavigationService;
pub use search::{SearchService, ShardSource};

/// Composite trait representing the full documentation browsing API.
/// This allows clients to depend on a single trait instead of multiple individual ones.
pub trait DocsEngine: SearchService + NavigationService + HierarchyService {}

impl<T> DocsEngine for T where T: SearchService + NavigationService + HierarchyService {}
