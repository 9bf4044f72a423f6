use super::text::decode_entities;
use docscope_api::{Diagnostic, NavNode};
use serde_json::Value;
use tracing::warn;

/// Read a navigation forest.
///
/// Nodes are either generated triples `[title, url|null, children|null|"table"]`
/// or objects `{title, target, children, deferred}`. A node without a title is
/// dropped together with its subtree.
pub fn read_nav_forest(value: &Value, context: &str) -> (Vec<NavNode>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let nodes = match value.as_array() {
        Some(items) => read_children(items, context, &mut diagnostics),
        None => {
            diagnostics.push(malformed(context, "navigation table is not a list"));
            Vec::new()
        }
    };
    (nodes, diagnostics)
}

fn read_children(items: &[Value], context: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<NavNode> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let at = format!("{}/{}", context, i);
            read_node(item, &at, diagnostics)
        })
        .collect()
}

fn read_node(item: &Value, at: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<NavNode> {
    let (title, target, children) = match item {
        Value::Array(parts) => (parts.first(), parts.get(1), parts.get(2)),
        Value::Object(map) => (map.get("title"), map.get("target"), map.get("children")),
        _ => {
            diagnostics.push(malformed(at, "node is neither a list nor an object"));
            return None;
        }
    };

    let Some(title) = title.and_then(Value::as_str) else {
        diagnostics.push(malformed(at, "node has no title"));
        return None;
    };

    let mut node = NavNode::new(
        decode_entities(title),
        target.and_then(Value::as_str).filter(|t| !t.is_empty()),
    );

    match children {
        Some(Value::Array(items)) => node.children = read_children(items, at, diagnostics),
        Some(Value::String(table)) if !table.is_empty() => node.deferred = Some(table.clone()),
        _ => {}
    }
    if let Some(table) = item.get("deferred").and_then(Value::as_str) {
        node.deferred = Some(table.to_string());
    }

    Some(node)
}

fn malformed(context: &str, reason: &str) -> Diagnostic {
    let diagnostic = Diagnostic::malformed(context, reason);
    warn!("{}", diagnostic);
    diagnostic
}
