//! Navigation tree and pane synchronization.
//!
//! The tree is immutable once built (apart from splicing in deferred tables
//! while a site is being loaded). Open and selected nodes live in a
//! caller-owned [`NavState`], keyed by [`NodePath`].

use crate::reader::read_nav_forest;
use docscope_api::{
    ApiError, ApiResult, Diagnostic, NavNode, NavRow, NavState, NavigationService, NodePath,
};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavTree {
    roots: Vec<NavNode>,
}

impl NavTree {
    /// Build from an already well-formed forest. Order is kept as given.
    pub fn new(roots: Vec<NavNode>) -> Self {
        Self { roots }
    }

    /// Build from a raw table, dropping nodes without a title.
    pub fn from_value(value: &Value, context: &str) -> (Self, Vec<Diagnostic>) {
        let (roots, diagnostics) = read_nav_forest(value, context);
        (Self::new(roots), diagnostics)
    }

    pub fn roots(&self) -> &[NavNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| {
            count += 1;
            false
        });
        count
    }

    pub fn node(&self, path: &NodePath) -> Option<&NavNode> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &i in rest {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    /// Pre-order walk. The visitor returns `true` to stop.
    fn walk<'a>(&'a self, mut visit: impl FnMut(&NodePath, &'a NavNode) -> bool) -> Option<NodePath> {
        fn go<'a>(
            nodes: &'a [NavNode],
            prefix: Option<&NodePath>,
            visit: &mut impl FnMut(&NodePath, &'a NavNode) -> bool,
        ) -> Option<NodePath> {
            for (i, node) in nodes.iter().enumerate() {
                let path = match prefix {
                    Some(p) => p.child(i),
                    None => NodePath::root(i),
                };
                if visit(&path, node) {
                    return Some(path);
                }
                if let Some(found) = go(&node.children, Some(&path), visit) {
                    return Some(found);
                }
            }
            None
        }
        go(&self.roots, None, &mut visit)
    }

    /// First node in document order whose target is exactly `target`.
    pub fn find_target(&self, target: &str) -> Option<NodePath> {
        self.walk(|_, node| node.target.as_deref() == Some(target))
    }

    pub fn expand(&self, state: &mut NavState, path: &NodePath) -> bool {
        if self.node(path).is_none() {
            return false;
        }
        state.open.insert(path.clone());
        true
    }

    pub fn collapse(&self, state: &mut NavState, path: &NodePath) -> bool {
        state.open.remove(path)
    }

    /// Open every node that has children.
    pub fn expand_all(&self, state: &mut NavState) {
        self.walk(|path, node| {
            if !node.children.is_empty() {
                state.open.insert(path.clone());
            }
            false
        });
    }

    /// Expand every ancestor of the first node targeting `current_path` and
    /// select that node. Leaves `state` untouched when nothing matches.
    pub fn sync_to(&self, state: &mut NavState, current_path: &str) -> Option<NodePath> {
        let Some(found) = self.find_target(current_path) else {
            debug!("'{}' is not in the navigation tree", current_path);
            return None;
        };
        for ancestor in found.ancestors() {
            state.open.insert(ancestor);
        }
        state.selected = Some(found.clone());
        Some(found)
    }

    /// Nodes from the outermost ancestor down to `path`.
    pub fn ancestors(&self, path: &NodePath) -> Option<Vec<&NavNode>> {
        let mut chain: Vec<&NavNode> = path
            .ancestors()
            .map(|p| self.node(&p))
            .collect::<Option<_>>()?;
        chain.push(self.node(path)?);
        Some(chain)
    }

    pub fn visible_rows(&self, state: &NavState) -> Vec<NavRow> {
        fn go(nodes: &[NavNode], prefix: Option<&NodePath>, state: &NavState, rows: &mut Vec<NavRow>) {
            for (i, node) in nodes.iter().enumerate() {
                let path = match prefix {
                    Some(p) => p.child(i),
                    None => NodePath::root(i),
                };
                let open = state.is_open(&path);
                rows.push(NavRow {
                    depth: path.depth(),
                    title: node.title.clone(),
                    target: node.target.clone(),
                    expandable: node.is_expandable(),
                    open,
                    selected: state.is_selected(&path),
                    path: path.clone(),
                });
                if open {
                    go(&node.children, Some(&path), state, rows);
                }
            }
        }

        let mut rows = Vec::new();
        go(&self.roots, None, state, &mut rows);
        rows
    }

    /// Tables that [`NavTree::attach`] could still fill, in document order
    /// and without repeats.
    pub fn pending_tables(&self) -> Vec<String> {
        fn go<'a>(nodes: &'a [NavNode], enclosing: &mut Vec<&'a str>, tables: &mut Vec<String>) {
            for node in nodes {
                let deferred = node.deferred.as_deref();
                if let Some(table) = deferred {
                    if node.children.is_empty()
                        && !enclosing.contains(&table)
                        && !tables.iter().any(|t| t == table)
                    {
                        tables.push(table.to_string());
                    }
                    enclosing.push(table);
                }
                go(&node.children, enclosing, tables);
                if deferred.is_some() {
                    enclosing.pop();
                }
            }
        }

        let mut tables = Vec::new();
        go(&self.roots, &mut Vec::new(), &mut tables);
        tables
    }

    /// Give `nodes` to every childless node deferring to `table`. Nodes
    /// nested inside another node deferring to `table` are skipped, so a
    /// table that refers back to itself is spliced in once per branch.
    /// Returns how many nodes were filled.
    pub fn attach(&mut self, table: &str, nodes: &[NavNode]) -> usize {
        fn go(list: &mut [NavNode], table: &str, nodes: &[NavNode], nested: bool) -> usize {
            let mut count = 0;
            for node in list.iter_mut() {
                let defers = node.deferred.as_deref() == Some(table);
                if defers && !nested && node.children.is_empty() {
                    node.children = nodes.to_vec();
                    count += 1;
                } else {
                    count += go(&mut node.children, table, nodes, nested || defers);
                }
            }
            count
        }

        if nodes.is_empty() {
            return 0;
        }
        go(&mut self.roots, table, nodes, false)
    }
}

impl NavigationService for NavTree {
    fn sync_to(&self, state: &mut NavState, current_path: &str) -> Option<NodePath> {
        NavTree::sync_to(self, state, current_path)
    }

    fn toggle(&self, state: &mut NavState, path: &NodePath) -> ApiResult<bool> {
        if self.node(path).is_none() {
            return Err(ApiError::NotFound(format!("navigation node {}", path)));
        }
        if state.open.remove(path) {
            Ok(false)
        } else {
            state.open.insert(path.clone());
            Ok(true)
        }
    }

    fn breadcrumb(&self, path: &NodePath) -> ApiResult<Vec<String>> {
        self.ancestors(path)
            .map(|chain| chain.into_iter().map(|n| n.title.clone()).collect())
            .ok_or_else(|| ApiError::NotFound(format!("navigation node {}", path)))
    }

    fn visible_rows(&self, state: &NavState) -> Vec<NavRow> {
        NavTree::visible_rows(self, state)
    }
}
