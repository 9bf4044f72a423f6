use docscope_api::{HierarchyNode, HierarchyRow, NavRow, NodeRef, SearchEntry};
use tabled::Tabled;
use tabled::{Table, settings::Style};

/// A terminal-optimized view of a search entry
#[derive(Tabled)]
pub struct EntryView {
    pub kind: String,
    pub label: String,
    pub scope: String,
    pub target: String,
}

impl From<&SearchEntry> for EntryView {
    fn from(entry: &SearchEntry) -> Self {
        Self {
            kind: entry.kind.to_string(),
            label: entry.label.clone(),
            scope: entry.scope.clone().unwrap_or_else(|| "-".to_string()),
            target: entry.target.href(),
        }
    }
}

/// A hierarchy node with its direct relations
#[derive(Tabled)]
pub struct NodeView {
    pub label: String,
    pub target: String,
    pub parents: String,
    pub children: String,
}

impl From<&HierarchyNode> for NodeView {
    fn from(node: &HierarchyNode) -> Self {
        Self {
            label: node.node.label.clone(),
            target: target_or_dash(&node.node),
            parents: join_labels(&node.parents),
            children: join_labels(&node.children),
        }
    }
}

fn target_or_dash(node: &NodeRef) -> String {
    if node.is_external() {
        "-".to_string()
    } else {
        node.target.clone()
    }
}

fn join_labels(refs: &[NodeRef]) -> String {
    if refs.is_empty() {
        return "-".to_string();
    }
    refs.iter()
        .map(|r| r.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn entry_table(entries: &[SearchEntry]) -> String {
    if entries.is_empty() {
        return "NO RECORDS FOUND".to_string();
    }
    let views: Vec<EntryView> = entries.iter().map(EntryView::from).collect();
    Table::new(&views).with(Style::psql()).to_string()
}

pub fn node_table(nodes: &[HierarchyNode]) -> String {
    if nodes.is_empty() {
        return "NO RECORDS FOUND".to_string();
    }
    let views: Vec<NodeView> = nodes.iter().map(NodeView::from).collect();
    Table::new(&views).with(Style::psql()).to_string()
}

/// Indented navigation pane. `*` marks the selected row.
pub fn nav_lines(rows: &[NavRow]) -> String {
    rows.iter()
        .map(|row| {
            let marker = match (row.expandable, row.open) {
                (true, true) => "▾",
                (true, false) => "▸",
                (false, _) => " ",
            };
            let selected = if row.selected { "*" } else { " " };
            format!(
                "{}{}{} {}  [{}]",
                selected,
                "  ".repeat(row.depth),
                marker,
                row.title,
                row.path
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn hierarchy_lines(rows: &[HierarchyRow]) -> String {
    rows.iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            if row.node.is_external() {
                format!("{}{} (external)", indent, row.node.label)
            } else {
                format!("{}{}", indent, row.node.label)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docscope_api::{EntryKind, NodePath, Target};

    #[test]
    fn test_entry_view() {
        let entry = SearchEntry::new("Mock", EntryKind::Class, Target::from_url("mock.html#a1"))
            .with_scope("mimicpp");
        let view = EntryView::from(&entry);
        assert_eq!(view.kind, "class");
        assert_eq!(view.scope, "mimicpp");
        assert_eq!(view.target, "mock.html#a1");
        assert!(entry_table(&[]).contains("NO RECORDS"));
    }

    #[test]
    fn test_nav_lines_mark_selection_and_state() {
        let rows = vec![
            NavRow {
                path: NodePath(vec![0]),
                depth: 0,
                title: "mimic++".to_string(),
                target: Some("index.html".to_string()),
                expandable: true,
                open: true,
                selected: false,
            },
            NavRow {
                path: NodePath(vec![0, 1]),
                depth: 1,
                title: "Classes".to_string(),
                target: None,
                expandable: false,
                open: false,
                selected: true,
            },
        ];
        let text = nav_lines(&rows);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], " ▾ mimic++  [0]");
        assert_eq!(lines[1], "*    Classes  [0/1]");
    }

    #[test]
    fn test_hierarchy_lines() {
        let rows = vec![
            HierarchyRow {
                depth: 0,
                node: NodeRef::new("std::false_type", ""),
            },
            HierarchyRow {
                depth: 1,
                node: NodeRef::new("is_overload_set", "s.html"),
            },
        ];
        assert_eq!(
            hierarchy_lines(&rows),
            "std::false_type (external)\n  is_overload_set"
        );
    }
}
