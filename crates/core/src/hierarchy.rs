//! Class hierarchy assembled from flattened `(child, parent)` records.
//!
//! Nodes are identified by `(label, target)`. Edges run from parent to child.
//! Records are applied in `(parent, child)` order, so an edge closing a cycle
//! is dropped the same way no matter how the input was ordered.

use docscope_api::{
    Diagnostic, HierarchyEdge, HierarchyNode, HierarchyRow, HierarchyService, NodeRef,
};
use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct HierarchyDag {
    topology: StableDiGraph<NodeRef, ()>,
    index: HashMap<NodeRef, NodeIndex>,
    by_label: HashMap<String, Vec<NodeIndex>>,
    diagnostics: Vec<Diagnostic>,
}

impl HierarchyDag {
    pub fn assemble(edges: impl IntoIterator<Item = HierarchyEdge>) -> Self {
        let mut nodes: BTreeSet<NodeRef> = BTreeSet::new();
        let mut relations: BTreeSet<(NodeRef, NodeRef)> = BTreeSet::new();

        for edge in edges {
            if let Some(parent) = edge.parent {
                nodes.insert(parent.clone());
                relations.insert((parent, edge.child.clone()));
            }
            nodes.insert(edge.child);
        }

        let mut dag = Self::default();
        for node in nodes {
            let idx = dag.topology.add_node(node.clone());
            dag.by_label.entry(node.label.clone()).or_default().push(idx);
            dag.index.insert(node, idx);
        }

        for (parent, child) in relations {
            let from = dag.index[&parent];
            let to = dag.index[&child];
            if from == to || has_path_connecting(&dag.topology, to, from, None) {
                let diagnostic = Diagnostic::CycleDetected { child, parent };
                warn!("{}", diagnostic);
                dag.diagnostics.push(diagnostic);
                continue;
            }
            dag.topology.add_edge(from, to, ());
        }

        debug!(
            "hierarchy assembled: {} nodes, {} edges, {} dropped",
            dag.topology.node_count(),
            dag.topology.edge_count(),
            dag.diagnostics.len()
        );
        dag
    }

    pub fn len(&self) -> usize {
        self.topology.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.topology.node_count() == 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn neighbors(&self, idx: NodeIndex, dir: Direction) -> Vec<NodeRef> {
        let mut refs: Vec<NodeRef> = self
            .topology
            .neighbors_directed(idx, dir)
            .map(|n| self.topology[n].clone())
            .collect();
        refs.sort();
        refs
    }

    fn materialize(&self, idx: NodeIndex) -> HierarchyNode {
        HierarchyNode {
            node: self.topology[idx].clone(),
            parents: self.neighbors(idx, Direction::Incoming),
            children: self.neighbors(idx, Direction::Outgoing),
        }
    }

    pub fn node(&self, node: &NodeRef) -> Option<HierarchyNode> {
        self.index.get(node).map(|&idx| self.materialize(idx))
    }

    /// Every node labelled `label`, sorted by target.
    pub fn lookup(&self, label: &str) -> Vec<HierarchyNode> {
        let mut found: Vec<HierarchyNode> = self
            .by_label
            .get(label)
            .into_iter()
            .flatten()
            .map(|&idx| self.materialize(idx))
            .collect();
        found.sort_by(|a, b| a.node.cmp(&b.node));
        found
    }

    fn sorted_indices(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.topology.node_indices().collect();
        indices.sort_by(|a, b| self.topology[*a].cmp(&self.topology[*b]));
        indices
    }

    pub fn nodes(&self) -> Vec<HierarchyNode> {
        self.sorted_indices()
            .into_iter()
            .map(|idx| self.materialize(idx))
            .collect()
    }

    /// Nodes with no parent once all records are merged.
    pub fn roots(&self) -> Vec<HierarchyNode> {
        self.sorted_indices()
            .into_iter()
            .filter(|&idx| {
                self.topology
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.materialize(idx))
            .collect()
    }

    /// Depth-first rows from every root, children in sorted order. A node
    /// with several parents appears under each of them.
    pub fn render_rows(&self) -> Vec<HierarchyRow> {
        let mut rows = Vec::new();
        for root in self.roots() {
            self.render_from(&root.node, 0, &mut rows);
        }
        rows
    }

    /// Rows of the subtree below `node`, starting with `node` itself at depth 0.
    pub fn render_subtree(&self, node: &NodeRef) -> Vec<HierarchyRow> {
        let mut rows = Vec::new();
        if self.index.contains_key(node) {
            self.render_from(node, 0, &mut rows);
        }
        rows
    }

    fn render_from(&self, node: &NodeRef, depth: usize, rows: &mut Vec<HierarchyRow>) {
        rows.push(HierarchyRow {
            depth,
            node: node.clone(),
        });
        let Some(&idx) = self.index.get(node) else {
            return;
        };
        for child in self.neighbors(idx, Direction::Outgoing) {
            self.render_from(&child, depth + 1, rows);
        }
    }
}

impl HierarchyService for HierarchyDag {
    fn hierarchy_roots(&self) -> Vec<HierarchyNode> {
        self.roots()
    }

    fn hierarchy_lookup(&self, label: &str) -> Vec<HierarchyNode> {
        self.lookup(label)
    }

    fn hierarchy_rows(&self) -> Vec<HierarchyRow> {
        self.render_rows()
    }

    fn hierarchy_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }
}
