//! Readers for the data files of a generated documentation site.

pub mod hierarchy;
pub mod js;
pub mod navtree;
pub mod search;
pub mod text;

pub use hierarchy::{read_edge_list, read_hierarchy};
pub use js::{JsTable, find_table, first_table, parse_tables};
pub use navtree::read_nav_forest;
pub use search::{SearchRow, read_json_shard, read_search_file, read_search_rows};
