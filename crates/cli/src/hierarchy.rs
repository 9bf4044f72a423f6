use crate::{open_site, report_diagnostics, view};
use docscope_api::HierarchyRow;
use std::path::PathBuf;

pub async fn run(
    site: PathBuf,
    label: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let site = open_site(&site, None).await?;
    let dag = site.hierarchy();

    let rows: Vec<HierarchyRow> = match &label {
        Some(label) => dag
            .lookup(label)
            .iter()
            .flat_map(|node| dag.render_subtree(&node.node))
            .collect(),
        None => dag.render_rows(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    report_diagnostics(&site);
    if rows.is_empty() {
        println!("NO RECORDS FOUND");
    } else {
        println!("{}", view::hierarchy_lines(&rows));
    }
    Ok(())
}
