use super::text::decode_entities;
use docscope_api::{Diagnostic, HierarchyEdge, NodeRef};
use serde_json::Value;
use tracing::{debug, warn};

/// Flatten a nested hierarchy table (`[label, url|null, children|null]`)
/// into edges. Top-level entries become root records.
pub fn read_hierarchy(value: &Value, context: &str) -> (Vec<HierarchyEdge>, Vec<Diagnostic>) {
    let mut edges = Vec::new();
    let mut diagnostics = Vec::new();

    match value.as_array() {
        Some(items) => walk(items, None, context, &mut edges, &mut diagnostics),
        None => diagnostics.push(malformed(context, "hierarchy table is not a list")),
    }

    (edges, diagnostics)
}

/// Read a flat JSON edge list (`[{child, parent}]`).
pub fn read_edge_list(value: &Value, context: &str) -> (Vec<HierarchyEdge>, Vec<Diagnostic>) {
    let mut edges = Vec::new();
    let mut diagnostics = Vec::new();

    let Some(items) = value.as_array() else {
        diagnostics.push(malformed(context, "edge list is not a list"));
        return (edges, diagnostics);
    };

    for (i, item) in items.iter().enumerate() {
        match serde_json::from_value::<HierarchyEdge>(item.clone()) {
            Ok(edge) if !edge.child.label.is_empty() => edges.push(edge),
            Ok(_) => diagnostics.push(malformed(&format!("{}[{}]", context, i), "edge child has no label")),
            Err(e) => diagnostics.push(malformed(&format!("{}[{}]", context, i), &e.to_string())),
        }
    }

    (edges, diagnostics)
}

fn walk(
    items: &[Value],
    parent: Option<&NodeRef>,
    context: &str,
    edges: &mut Vec<HierarchyEdge>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (i, item) in items.iter().enumerate() {
        let at = format!("{}/{}", context, i);
        let Some(label) = item.get(0).and_then(Value::as_str).filter(|l| !l.is_empty()) else {
            diagnostics.push(malformed(&at, "entry has no label"));
            continue;
        };
        let target = item.get(1).and_then(Value::as_str).unwrap_or_default();
        let node = NodeRef::new(decode_entities(label), target);

        edges.push(HierarchyEdge {
            child: node.clone(),
            parent: parent.cloned(),
        });

        match item.get(2) {
            Some(Value::Array(children)) => walk(children, Some(&node), &at, edges, diagnostics),
            Some(Value::String(table)) => {
                debug!("hierarchy entry {} defers children to '{}'; skipped", node, table)
            }
            _ => {}
        }
    }
}

fn malformed(context: &str, reason: &str) -> Diagnostic {
    let diagnostic = Diagnostic::malformed(context, reason);
    warn!("{}", diagnostic);
    diagnostic
}
