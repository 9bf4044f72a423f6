use crate::{open_site, report_diagnostics, view};
use std::path::PathBuf;
use tracing::info;

pub async fn run(
    site: PathBuf,
    query: String,
    limit: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let site = open_site(&site, limit).await?;
    let Some(response) = site.search_index().query(&query).await.into_response() else {
        return Ok(());
    };
    info!("'{}' matched {} entries", query, response.entries.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    for diagnostic in &response.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
    report_diagnostics(&site);
    println!("{}", view::entry_table(&response.entries));
    Ok(())
}
