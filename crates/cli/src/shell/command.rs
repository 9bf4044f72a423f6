use super::context::ShellContext;
use crate::view;
use clap::Parser;
use clap::error::ErrorKind;
use docscope_api::{HierarchyNode, NavigationService, NodePath, NodeRef};

/// Default limit for search results
const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Helper struct for Clap parsing within the shell
#[derive(Parser, Clone, Debug)]
#[command(no_binary_name = true)]
pub enum ShellCommand {
    /// Search the symbol index
    Find {
        /// Text to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Limit number of results
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Go to a page (e.g. `classfoo.html#a1`) or to the best match for a label
    Open {
        /// Page or label
        target: String,
    },
    /// Print the current page and where it sits in the navigation tree
    Pwd,
    /// Show the navigation pane
    Tree {
        /// Expand every node first
        #[arg(short, long)]
        all: bool,
    },
    /// Expand a navigation node (path as printed by `tree`, e.g. 0/2/1)
    Expand { path: NodePath },
    /// Collapse a navigation node
    Collapse { path: NodePath },
    /// List the direct bases of a class
    Bases { label: String },
    /// List the direct subclasses of a class
    Derived { label: String },
    /// Print the class hierarchy, or the subtree below a class
    Hierarchy { label: Option<String> },
    /// Clear the screen
    Clear,
}

impl ShellCommand {
    /// Automatically generates the list of available command names from the enum.
    pub fn command_names() -> Vec<String> {
        use clap::CommandFactory;
        let cmd = Self::command();
        let mut names = vec!["help".to_string(), "exit".to_string(), "quit".to_string()];
        names.extend(cmd.get_subcommands().map(|s| s.get_name().to_string()));
        names
    }

    pub fn execute(&self, context: &ShellContext) -> Result<String, Box<dyn std::error::Error>> {
        let site = &context.site;
        match self {
            ShellCommand::Find { query, limit } => {
                let query = query.join(" ");
                let Some(mut response) = context.search(&query) else {
                    return Ok(String::new());
                };
                response.entries.truncate(*limit);
                let mut out = view::entry_table(&response.entries);
                for diagnostic in &response.diagnostics {
                    out.push_str(&format!("\nwarning: {}", diagnostic));
                }
                Ok(out)
            }
            ShellCommand::Open { target } => {
                let page = if looks_like_page(target) {
                    target.clone()
                } else {
                    let best = context
                        .search(target)
                        .and_then(|r| r.entries.into_iter().next())
                        .ok_or_else(|| format!("nothing matches '{}'", target))?;
                    best.target.href()
                };
                match context.open(&page) {
                    Some(path) => Ok(format!("{}\n{}", page, site.breadcrumb(&path)?.join(" > "))),
                    None => Ok(format!("{}\n(not in the navigation tree)", page)),
                }
            }
            ShellCommand::Pwd => {
                let Some(page) = context.current_page() else {
                    return Ok("/".to_string());
                };
                match context.nav_state().selected {
                    Some(path) => Ok(format!("{}\n{}", page, site.breadcrumb(&path)?.join(" > "))),
                    None => Ok(page),
                }
            }
            ShellCommand::Tree { all } => {
                if *all {
                    context.with_nav_state(|state| site.nav().expand_all(state));
                }
                Ok(view::nav_lines(&site.visible_rows(&context.nav_state())))
            }
            ShellCommand::Expand { path } => {
                let opened = context.with_nav_state(|state| site.nav().expand(state, path));
                if !opened {
                    return Err(format!("no navigation node {}", path).into());
                }
                Ok(view::nav_lines(&site.visible_rows(&context.nav_state())))
            }
            ShellCommand::Collapse { path } => {
                context.with_nav_state(|state| site.nav().collapse(state, path));
                Ok(view::nav_lines(&site.visible_rows(&context.nav_state())))
            }
            ShellCommand::Bases { label } => {
                let nodes = related(context, label, |n| &n.parents)?;
                Ok(view::node_table(&nodes))
            }
            ShellCommand::Derived { label } => {
                let nodes = related(context, label, |n| &n.children)?;
                Ok(view::node_table(&nodes))
            }
            ShellCommand::Hierarchy { label } => {
                let dag = site.hierarchy();
                let rows = match label {
                    Some(label) => {
                        let found = dag.lookup(label);
                        if found.is_empty() {
                            return Err(format!("no class named '{}'", label).into());
                        }
                        found
                            .iter()
                            .flat_map(|node| dag.render_subtree(&node.node))
                            .collect()
                    }
                    None => dag.render_rows(),
                };
                Ok(view::hierarchy_lines(&rows))
            }
            ShellCommand::Clear => Ok(String::new()),
        }
    }
}

fn looks_like_page(target: &str) -> bool {
    let path = target.split('#').next().unwrap_or(target);
    path.ends_with(".html")
}

/// Nodes on one side of every class labelled `label`.
fn related(
    context: &ShellContext,
    label: &str,
    side: impl Fn(&HierarchyNode) -> &Vec<NodeRef>,
) -> Result<Vec<HierarchyNode>, Box<dyn std::error::Error>> {
    let dag = context.site.hierarchy();
    let found = dag.lookup(label);
    if found.is_empty() {
        return Err(format!("no class named '{}'", label).into());
    }
    let mut nodes: Vec<HierarchyNode> = found
        .iter()
        .flat_map(|node| side(node).iter().filter_map(|r| dag.node(r)))
        .collect();
    nodes.sort_by(|a, b| a.node.cmp(&b.node));
    nodes.dedup_by(|a, b| a.node == b.node);
    Ok(nodes)
}

pub fn parse_shell_command(
    input: &str,
) -> Result<Option<ShellCommand>, Box<dyn std::error::Error>> {
    // Use shlex to split arguments while respecting quotes
    let args = shlex::split(input).ok_or("Invalid quoting")?;

    match ShellCommand::try_parse_from(args) {
        Ok(c) => Ok(Some(c)),
        Err(e) => {
            // Handle help/version display without returning an error
            if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion {
                println!("{}", e);
                return Ok(None);
            }
            Err(Box::new(e))
        }
    }
}
