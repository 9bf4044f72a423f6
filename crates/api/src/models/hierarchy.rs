use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a hierarchy node. Two refs with equal label and target are the same node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub struct NodeRef {
    pub label: String,
    /// Empty for bases without a documentation page.
    #[serde(default)]
    pub target: String,
}

impl NodeRef {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.target.is_empty()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target.is_empty() {
            f.write_str(&self.label)
        } else {
            write!(f, "{} ({})", self.label, self.target)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
pub struct HierarchyEdge {
    pub child: NodeRef,
    /// `None` marks a root record.
    #[serde(default)]
    pub parent: Option<NodeRef>,
}

impl HierarchyEdge {
    pub fn root(child: NodeRef) -> Self {
        Self {
            child,
            parent: None,
        }
    }

    pub fn new(child: NodeRef, parent: NodeRef) -> Self {
        Self {
            child,
            parent: Some(parent),
        }
    }
}

/// De-duplicated node of the assembled hierarchy. Both lists are sorted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub node: NodeRef,
    pub parents: Vec<NodeRef>,
    pub children: Vec<NodeRef>,
}

/// Depth-annotated row for indentation-based rendering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub depth: usize,
    pub node: NodeRef,
}
