//! Search shard rows.
//!
//! A generated shard is a list of rows `[key, [label, [url, flag, scope], ...]]`.
//! Every `[url, flag, scope]` triple becomes one `SearchEntry`; rows sharing a
//! label (overload sets) therefore yield several entries.

use super::js;
use super::text::{decode_entities, search_key_text};
use crate::error::Result;
use docscope_api::{Diagnostic, EntryKind, SearchEntry, Target};
use serde_json::Value;
use tracing::warn;

/// Entries of one search row, with the row's decoded key.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRow {
    pub key: String,
    pub entries: Vec<SearchEntry>,
}

/// Parse a `var searchData = [...]` shard file.
pub fn read_search_file(src: &str, context: &str) -> Result<(Vec<SearchEntry>, Vec<Diagnostic>)> {
    let value = js::first_table(src)?;
    let (rows, diagnostics) = read_search_rows(&value, context);
    let entries = rows.into_iter().flat_map(|row| row.entries).collect();
    Ok((entries, diagnostics))
}

/// Parse a JSON shard: a list of serialized `SearchEntry` objects.
pub fn read_json_shard(src: &str, context: &str) -> Result<(Vec<SearchEntry>, Vec<Diagnostic>)> {
    let values: Vec<Value> = serde_json::from_str(src)?;
    let mut entries = Vec::with_capacity(values.len());
    let mut diagnostics = Vec::new();

    for (i, value) in values.into_iter().enumerate() {
        let at = format!("{}[{}]", context, i);
        match serde_json::from_value::<SearchEntry>(value) {
            Ok(entry) => match entry.missing_field() {
                None => entries.push(entry),
                Some(field) => diagnostics.push(malformed(&at, format!("missing {}", field))),
            },
            Err(e) => diagnostics.push(malformed(&at, e.to_string())),
        }
    }

    Ok((entries, diagnostics))
}

pub fn read_search_rows(value: &Value, context: &str) -> (Vec<SearchRow>, Vec<Diagnostic>) {
    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();

    let Some(items) = value.as_array() else {
        diagnostics.push(malformed(context, "shard is not a list"));
        return (rows, diagnostics);
    };

    for (i, item) in items.iter().enumerate() {
        let at = format!("{}[{}]", context, i);
        match read_row(item, &at, &mut diagnostics) {
            Ok(row) => rows.push(row),
            Err(reason) => diagnostics.push(malformed(&at, reason)),
        }
    }

    (rows, diagnostics)
}

fn read_row(
    item: &Value,
    at: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> std::result::Result<SearchRow, String> {
    let key = item
        .get(0)
        .and_then(Value::as_str)
        .ok_or("row has no key")?;
    let body = item
        .get(1)
        .and_then(Value::as_array)
        .ok_or("row has no body")?;
    let label = body
        .first()
        .and_then(Value::as_str)
        .map(decode_entities)
        .filter(|l| !l.trim().is_empty())
        .ok_or("row has no label")?;

    let mut entries = Vec::new();
    for (j, raw) in body.iter().enumerate().skip(1) {
        match read_target(raw, &label) {
            Ok(entry) => entries.push(entry),
            Err(reason) => diagnostics.push(malformed(&format!("{}.{}", at, j), reason)),
        }
    }
    if entries.is_empty() {
        return Err(format!("row '{}' has no usable target", label));
    }

    Ok(SearchRow {
        key: search_key_text(key),
        entries,
    })
}

fn read_target(raw: &Value, label: &str) -> std::result::Result<SearchEntry, String> {
    let url = raw
        .get(0)
        .and_then(Value::as_str)
        .ok_or("target has no url")?;
    let target = Target::from_url(normalize_url(url));
    if target.path.is_empty() {
        return Err("target has an empty path".to_string());
    }

    let scope = raw
        .get(2)
        .and_then(Value::as_str)
        .map(decode_entities)
        .filter(|s| !s.is_empty());
    let kind = infer_kind(&target, label, scope.as_deref());

    let mut entry = SearchEntry::new(label, kind, target);
    entry.scope = scope;
    Ok(entry)
}

/// Search pages live one directory below the site root.
fn normalize_url(url: &str) -> &str {
    url.trim_start_matches("../")
}

/// Generated rows carry no kind, so it is read off the page name and scope.
pub fn infer_kind(target: &Target, label: &str, scope: Option<&str>) -> EntryKind {
    let page = target.path.rsplit('/').next().unwrap_or(&target.path);
    let stem = page.strip_suffix(".html").unwrap_or(page);
    let file_page = stem.contains("_8h");

    let Some(anchor) = target.anchor.as_deref() else {
        return if ["class", "struct", "union"].iter().any(|p| stem.starts_with(p)) {
            EntryKind::Class
        } else if stem.starts_with("namespace") {
            EntryKind::Namespace
        } else if stem.starts_with("concept") {
            EntryKind::Concept
        } else if file_page {
            EntryKind::File
        } else {
            EntryKind::Section
        };
    };

    if anchor.starts_with("autotoc_md") {
        return EntryKind::Section;
    }

    let scope = scope.unwrap_or_default();
    let header_scope = !scope.contains("::") && scope.contains(".h");
    if is_macro_name(label) && (header_scope || file_page) {
        EntryKind::Macro
    } else if scope.ends_with(')') {
        EntryKind::Function
    } else {
        EntryKind::Variable
    }
}

fn is_macro_name(label: &str) -> bool {
    label.chars().any(|c| c.is_ascii_uppercase())
        && label
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn malformed(context: &str, reason: impl Into<String>) -> Diagnostic {
    let diagnostic = Diagnostic::malformed(context, reason);
    warn!("{}", diagnostic);
    diagnostic
}
