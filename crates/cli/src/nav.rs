use crate::{open_site, report_diagnostics, view};
use docscope_api::NavState;
use std::path::PathBuf;

pub async fn run(
    site: PathBuf,
    sync: Option<String>,
    all: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let site = open_site(&site, None).await?;
    let tree = site.nav();
    let mut state = NavState::default();

    if all {
        tree.expand_all(&mut state);
    }
    if let Some(page) = &sync {
        if tree.sync_to(&mut state, page).is_none() {
            eprintln!("warning: '{}' is not in the navigation tree", page);
        }
    }

    let rows = tree.visible_rows(&state);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        report_diagnostics(&site);
        println!("{}", view::nav_lines(&rows));
    }
    Ok(())
}
