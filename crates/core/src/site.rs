//! A generated documentation site opened for querying.

use crate::config::DocscopeConfig;
use crate::error::{DocscopeError, Result};
use crate::hierarchy::HierarchyDag;
use crate::navtree::NavTree;
use crate::reader;
use crate::search::{DirShardSource, SearchIndex};
use async_trait::async_trait;
use docscope_api::{
    ApiResult, Diagnostic, HierarchyNode, HierarchyRow, HierarchyService, NavNode, NavRow,
    NavState, NavigationService, NodePath, SearchOutcome, SearchService,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the root navigation table.
const NAVTREE_TABLE: &str = "NAVTREE";

pub struct Site {
    root: PathBuf,
    config: DocscopeConfig,
    nav: NavTree,
    hierarchy: HierarchyDag,
    search: SearchIndex,
    diagnostics: Vec<Diagnostic>,
}

impl Site {
    /// Open `root` with the configuration found in it.
    pub async fn open_default(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = DocscopeConfig::load(&root)?;
        Self::open(root, config).await
    }

    /// Load navigation and hierarchy eagerly. Search shards load on demand.
    ///
    /// Missing or damaged files are not fatal: they leave the corresponding
    /// part empty and are reported through [`Site::diagnostics`].
    pub async fn open(root: impl Into<PathBuf>, config: DocscopeConfig) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DocscopeError::SiteNotFound(root));
        }

        let mut diagnostics = Vec::new();
        let nav = load_nav(&root.join(&config.navtree_file), &mut diagnostics).await;
        let hierarchy = load_hierarchy(&root.join(&config.hierarchy_file), &mut diagnostics).await;

        let source = DirShardSource::new(root.join(&config.search_dir));
        let search = SearchIndex::new(Arc::new(source)).with_max_results(config.max_results);

        info!(
            "opened {}: {} navigation nodes, {} hierarchy nodes, {} diagnostics",
            root.display(),
            nav.len(),
            hierarchy.len(),
            diagnostics.len() + hierarchy.diagnostics().len()
        );

        Ok(Self {
            root,
            config,
            nav,
            hierarchy,
            search,
            diagnostics,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &DocscopeConfig {
        &self.config
    }

    pub fn nav(&self) -> &NavTree {
        &self.nav
    }

    pub fn hierarchy(&self) -> &HierarchyDag {
        &self.hierarchy
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    /// Everything reported while opening the site, cycles included.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        all.extend_from_slice(self.hierarchy.diagnostics());
        all
    }
}

async fn read_optional(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(src) => Some(src),
        Err(e) => {
            let diagnostic = Diagnostic::malformed(path.display().to_string(), e.to_string());
            warn!("{}", diagnostic);
            diagnostics.push(diagnostic);
            None
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn load_nav(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> NavTree {
    let Some(src) = read_optional(path, diagnostics).await else {
        return NavTree::default();
    };
    let context = file_label(path);
    let value = match reader::find_table(&src, NAVTREE_TABLE) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.push(Diagnostic::malformed(&context, e.to_string()));
            warn!("{}: {}", context, e);
            return NavTree::default();
        }
    };

    let (mut tree, mut found) = NavTree::from_value(&value, &context);
    diagnostics.append(&mut found);

    let dir = path.parent().unwrap_or(Path::new("."));
    attach_deferred(&mut tree, dir, diagnostics).await;
    tree
}

/// Splice in every table the tree defers to, including tables referenced
/// from tables spliced in earlier. Each table file is read at most once and
/// its nodes are reused for every node deferring to it.
async fn attach_deferred(tree: &mut NavTree, dir: &Path, diagnostics: &mut Vec<Diagnostic>) {
    let mut tables: HashMap<String, Vec<NavNode>> = HashMap::new();
    loop {
        let mut filled = 0;
        for table in tree.pending_tables() {
            if !tables.contains_key(&table) {
                let nodes = read_nav_table(dir, &table, diagnostics).await;
                tables.insert(table.clone(), nodes);
            }
            let Some(nodes) = tables.get(&table) else {
                continue;
            };
            let count = tree.attach(&table, nodes);
            if count > 0 {
                debug!("attached '{}' ({} nodes) under {} parents", table, nodes.len(), count);
            }
            filled += count;
        }
        if filled == 0 {
            break;
        }
    }
}

/// Nodes of `<dir>/<table>.js`. Unreadable tables yield no nodes.
async fn read_nav_table(dir: &Path, table: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<NavNode> {
    let path = dir.join(format!("{}.js", table));
    let Some(src) = read_optional(&path, diagnostics).await else {
        return Vec::new();
    };
    let value = match reader::first_table(&src) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.push(Diagnostic::malformed(table, e.to_string()));
            warn!("{}: {}", table, e);
            return Vec::new();
        }
    };
    let (nodes, mut found) = reader::read_nav_forest(&value, table);
    diagnostics.append(&mut found);
    nodes
}

async fn load_hierarchy(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> HierarchyDag {
    let Some(src) = read_optional(path, diagnostics).await else {
        return HierarchyDag::default();
    };
    let context = file_label(path);
    let is_json = path.extension().is_some_and(|ext| ext == "json");

    let value = if is_json {
        serde_json::from_str(&src).map_err(DocscopeError::from)
    } else {
        reader::first_table(&src)
    };
    let value = match value {
        Ok(value) => value,
        Err(e) => {
            diagnostics.push(Diagnostic::malformed(&context, e.to_string()));
            warn!("{}: {}", context, e);
            return HierarchyDag::default();
        }
    };

    let (edges, mut found) = if is_json {
        reader::read_edge_list(&value, &context)
    } else {
        reader::read_hierarchy(&value, &context)
    };
    diagnostics.append(&mut found);
    HierarchyDag::assemble(edges)
}

#[async_trait]
impl SearchService for Site {
    async fn search(&self, query: &str) -> ApiResult<SearchOutcome> {
        Ok(self.search.query(query).await)
    }

    async fn complete(&self, prefix: &str, limit: usize) -> ApiResult<Vec<String>> {
        Ok(self.search.complete(prefix, limit).await)
    }
}

impl NavigationService for Site {
    fn sync_to(&self, state: &mut NavState, current_path: &str) -> Option<NodePath> {
        self.nav.sync_to(state, current_path)
    }

    fn toggle(&self, state: &mut NavState, path: &NodePath) -> ApiResult<bool> {
        NavigationService::toggle(&self.nav, state, path)
    }

    fn breadcrumb(&self, path: &NodePath) -> ApiResult<Vec<String>> {
        self.nav.breadcrumb(path)
    }

    fn visible_rows(&self, state: &NavState) -> Vec<NavRow> {
        self.nav.visible_rows(state)
    }
}

impl HierarchyService for Site {
    fn hierarchy_roots(&self) -> Vec<HierarchyNode> {
        self.hierarchy.roots()
    }

    fn hierarchy_lookup(&self, label: &str) -> Vec<HierarchyNode> {
        self.hierarchy.lookup(label)
    }

    fn hierarchy_rows(&self) -> Vec<HierarchyRow> {
        self.hierarchy.render_rows()
    }

    fn hierarchy_diagnostics(&self) -> Vec<Diagnostic> {
        self.hierarchy.diagnostics().to_vec()
    }
}
