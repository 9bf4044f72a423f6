use crate::error::Result;
use crate::search::DEFAULT_MAX_RESULTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the optional per-site configuration file.
pub const CONFIG_FILE: &str = "docscope.json";

/// Where the generated data lives inside a site, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocscopeConfig {
    pub search_dir: PathBuf,
    pub navtree_file: PathBuf,
    pub hierarchy_file: PathBuf,
    pub max_results: usize,
}

impl Default for DocscopeConfig {
    fn default() -> Self {
        Self {
            search_dir: PathBuf::from("search"),
            navtree_file: PathBuf::from("navtreedata.js"),
            hierarchy_file: PathBuf::from("hierarchy.js"),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl DocscopeConfig {
    /// Read `<root>/docscope.json`, falling back to defaults when it is absent.
    /// Keys missing from the file keep their default values.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Self::default());
        }
        let src = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&src)?;
        debug!("loaded {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        if let Some(max) = max_results {
            self.max_results = max;
        }
        self
    }
}
