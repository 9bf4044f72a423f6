use crate::error::ApiResult;
use crate::models::{NavRow, NavState, NodePath};

/// Navigation pane operations.
///
/// The pane state is owned by the caller; implementations never keep open or
/// selected nodes of their own. This keeps the tree itself immutable and lets
/// several panes (or tests) share one tree.
pub trait NavigationService: Send + Sync {
    /// Expand the ancestors of the first node (in document order) whose target
    /// equals `current_path`, and select it.
    ///
    /// Returns the selected node, or `None` when no node matches. In that case
    /// `state` is left exactly as it was.
    fn sync_to(&self, state: &mut NavState, current_path: &str) -> Option<NodePath>;

    /// Flip the open flag of `path`. Returns the new flag.
    fn toggle(&self, state: &mut NavState, path: &NodePath) -> ApiResult<bool>;

    /// Titles from the outermost ancestor down to `path` itself.
    fn breadcrumb(&self, path: &NodePath) -> ApiResult<Vec<String>>;

    /// Rows the pane shows for `state`.
    fn visible_rows(&self, state: &NavState) -> Vec<NavRow>;
}
