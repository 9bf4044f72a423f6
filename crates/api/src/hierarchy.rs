use crate::diagnostics::Diagnostic;
use crate::models::{HierarchyNode, HierarchyRow};

/// Read access to the assembled class hierarchy.
pub trait HierarchyService: Send + Sync {
    /// Nodes without parents, sorted by label then target.
    fn hierarchy_roots(&self) -> Vec<HierarchyNode>;

    /// Every node carrying `label`. A label may name several nodes
    /// (template instantiations, overload sets).
    fn hierarchy_lookup(&self, label: &str) -> Vec<HierarchyNode>;

    fn hierarchy_rows(&self) -> Vec<HierarchyRow>;

    /// Cycles broken during assembly.
    fn hierarchy_diagnostics(&self) -> Vec<Diagnostic>;
}
