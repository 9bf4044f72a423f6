mod hierarchy;
mod nav;
mod schema;
mod search;
mod shell;
mod view;

use clap::{Parser, Subcommand};
use docscope_core::{DocscopeConfig, Site};
use std::path::{Path, PathBuf};

pub use schema::SchemaKind;

#[derive(Parser)]
#[command(
    name = "docscope",
    version,
    about = "Browse generated C++ API documentation from the terminal",
    long_about = "Docscope reads the data files a documentation build emits (search shards, \
                  navigation tables and the class hierarchy) and answers queries against them \
                  without a browser."
)]
pub struct Cli {
    /// Also write log output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the symbol index
    #[command(
        long_about = "Ranks matching entries: exact label matches first, then prefix matches, \
                            then substring matches. Only the shard of the query's first character is read."
    )]
    Search {
        /// Text to search for (case-insensitive)
        query: String,
        /// Root directory of the generated site
        #[arg(long, value_name = "SITE", default_value = ".")]
        site: PathBuf,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the navigation tree, optionally synchronized to a page
    Nav {
        /// Root directory of the generated site
        #[arg(long, value_name = "SITE", default_value = ".")]
        site: PathBuf,
        /// Page (with optional #anchor) to reveal and select
        #[arg(long, value_name = "PAGE")]
        sync: Option<String>,
        /// Expand every node
        #[arg(long)]
        all: bool,
        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },
    /// Print the class hierarchy
    Hierarchy {
        /// Root directory of the generated site
        #[arg(long, value_name = "SITE", default_value = ".")]
        site: PathBuf,
        /// Only show the subtree below this class
        #[arg(long)]
        label: Option<String>,
        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON schema of an input format docscope accepts
    Schema {
        #[arg(value_enum, default_value_t = SchemaKind::Shard)]
        kind: SchemaKind,
    },
    /// Start an interactive shell on a generated site
    Shell {
        /// Root directory of the generated site. Defaults to the current directory.
        #[arg(value_name = "SITE")]
        site: Option<PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Shell { .. } => "shell",
        _ => "cli",
    };
    let _guard = docscope_core::logging::init_logging(component, cli.verbose);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Search {
            query,
            site,
            limit,
            json,
        } => rt.block_on(search::run(site, query, limit, json)),
        Commands::Nav {
            site,
            sync,
            all,
            json,
        } => rt.block_on(nav::run(site, sync, all, json)),
        Commands::Hierarchy { site, label, json } => rt.block_on(hierarchy::run(site, label, json)),
        Commands::Schema { kind } => schema::run(kind),
        Commands::Shell { site } => {
            let root = match site {
                Some(p) => p,
                None => std::env::current_dir()?.canonicalize()?,
            };
            let site = rt.block_on(Site::open_default(root))?;
            // The shell blocks on the runtime from its own thread.
            shell::run(site, rt.handle().clone())
        }
    }
}

/// Open a site, applying a command-line result limit on top of its config.
pub(crate) async fn open_site(root: &Path, limit: Option<usize>) -> docscope_core::Result<Site> {
    let config = DocscopeConfig::load(root)?.with_max_results(limit);
    Site::open(root, config).await
}

/// Report load problems on stderr so they never mix with command output.
pub(crate) fn report_diagnostics(site: &Site) {
    for diagnostic in site.diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }
}
