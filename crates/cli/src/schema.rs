use clap::ValueEnum;
use docscope_api::{HierarchyEdge, NavNode, SearchEntry};

/// Input formats that can be supplied as JSON instead of generated files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum SchemaKind {
    /// `search/<bucket>.json`
    Shard,
    /// Hierarchy edge list (`hierarchy_file` ending in `.json`)
    Edges,
    /// Navigation forest
    Nav,
}

pub fn schema_json(kind: SchemaKind) -> serde_json::Result<String> {
    let schema = match kind {
        SchemaKind::Shard => schemars::schema_for!(Vec<SearchEntry>),
        SchemaKind::Edges => schemars::schema_for!(Vec<HierarchyEdge>),
        SchemaKind::Nav => schemars::schema_for!(Vec<NavNode>),
    };
    serde_json::to_string_pretty(&schema)
}

pub fn run(kind: SchemaKind) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", schema_json(kind)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_schema_names_entry_fields() {
        let json = schema_json(SchemaKind::Shard).unwrap();
        assert!(json.contains("\"label\""));
        assert!(json.contains("\"target\""));
        assert!(json.contains("\"concept\""));
    }

    #[test]
    fn test_edges_schema() {
        let json = schema_json(SchemaKind::Edges).unwrap();
        assert!(json.contains("\"child\""));
        assert!(json.contains("\"parent\""));
    }
}
