use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One entry of the site's table of contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct NavNode {
    pub title: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub children: Vec<NavNode>,
    /// Name of a separately generated table that supplies this node's children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred: Option<String>,
}

impl NavNode {
    pub fn new(title: impl Into<String>, target: Option<&str>) -> Self {
        Self {
            title: title.into(),
            target: target.map(str::to_string),
            children: Vec::new(),
            deferred: None,
        }
    }

    pub fn with_children(mut self, children: Vec<NavNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_deferred(mut self, table: impl Into<String>) -> Self {
        self.deferred = Some(table.into());
        self
    }

    /// A grouping node has no page of its own.
    pub fn is_group(&self) -> bool {
        self.target.is_none()
    }

    pub fn is_expandable(&self) -> bool {
        !self.children.is_empty() || self.deferred.is_some()
    }
}

/// Position of a node inside the tree: child indices from the root list down.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Proper ancestors, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = NodePath> + '_ {
        (1..self.0.len()).map(|len| NodePath(self.0[..len].to_vec()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("/"))
    }
}

impl FromStr for NodePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .trim_matches('/')
            .split('/')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| format!("invalid node path '{}'", s))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if steps.is_empty() {
            return Err(format!("invalid node path '{}'", s));
        }
        Ok(Self(steps))
    }
}

/// Ephemeral pane state. Owned by the caller and passed into tree operations.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NavState {
    pub open: BTreeSet<NodePath>,
    pub selected: Option<NodePath>,
}

impl NavState {
    pub fn is_open(&self, path: &NodePath) -> bool {
        self.open.contains(path)
    }

    pub fn is_selected(&self, path: &NodePath) -> bool {
        self.selected.as_ref() == Some(path)
    }
}

/// A row the navigation pane currently shows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NavRow {
    pub path: NodePath,
    pub depth: usize,
    pub title: String,
    pub target: Option<String>,
    pub expandable: bool,
    pub open: bool,
    pub selected: bool,
}
