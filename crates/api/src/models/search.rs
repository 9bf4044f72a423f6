use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Class,
    Namespace,
    Concept,
    Typedef,
    Enum,
    Function,
    Variable,
    Macro,
    File,
    Section,
}

impl EntryKind {
    /// Tie-break weight inside a match tier. Lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            EntryKind::Class
            | EntryKind::Namespace
            | EntryKind::Concept
            | EntryKind::Typedef
            | EntryKind::Enum => 0,
            EntryKind::Function => 1,
            EntryKind::Variable => 2,
            EntryKind::Macro => 3,
            EntryKind::File => 4,
            EntryKind::Section => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Class => "class",
            EntryKind::Namespace => "namespace",
            EntryKind::Concept => "concept",
            EntryKind::Typedef => "typedef",
            EntryKind::Enum => "enum",
            EntryKind::Function => "function",
            EntryKind::Variable => "variable",
            EntryKind::Macro => "macro",
            EntryKind::File => "file",
            EntryKind::Section => "section",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" | "struct" | "union" => Ok(EntryKind::Class),
            "namespace" => Ok(EntryKind::Namespace),
            "concept" => Ok(EntryKind::Concept),
            "typedef" => Ok(EntryKind::Typedef),
            "enum" => Ok(EntryKind::Enum),
            "function" => Ok(EntryKind::Function),
            "variable" => Ok(EntryKind::Variable),
            "macro" | "define" => Ok(EntryKind::Macro),
            "file" => Ok(EntryKind::File),
            "section" | "page" => Ok(EntryKind::Section),
            other => Err(format!("unknown entry kind '{}'", other)),
        }
    }
}

/// Navigation target of a search hit. The anchor is carried verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub struct Target {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl Target {
    pub fn new(path: impl Into<String>, anchor: Option<String>) -> Self {
        Self {
            path: path.into(),
            anchor,
        }
    }

    /// Splits `path#anchor` at the first `#`. An empty anchor is treated as absent.
    pub fn from_url(url: &str) -> Self {
        match url.split_once('#') {
            Some((path, anchor)) if !anchor.is_empty() => {
                Self::new(path, Some(anchor.to_string()))
            }
            Some((path, _)) => Self::new(path, None),
            None => Self::new(url, None),
        }
    }

    pub fn href(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{}", self.path, anchor),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
pub struct SearchEntry {
    pub label: String,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub target: Target,
}

impl SearchEntry {
    pub fn new(label: impl Into<String>, kind: EntryKind, target: Target) -> Self {
        Self {
            label: label.into(),
            kind,
            scope: None,
            target,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.scope = if scope.is_empty() { None } else { Some(scope) };
        self
    }

    /// Returns the name of the first missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.label.trim().is_empty() {
            Some("label")
        } else if self.target.path.trim().is_empty() {
            Some("target.path")
        } else {
            None
        }
    }
}

/// Normalized leading character that selects a search shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Letter(char),
    Digit,
    Symbol,
}

impl BucketKey {
    pub fn from_char(c: char) -> Self {
        if c.is_ascii_digit() {
            BucketKey::Digit
        } else if c.is_alphabetic() {
            BucketKey::Letter(c.to_lowercase().next().unwrap_or(c))
        } else {
            BucketKey::Symbol
        }
    }

    /// Bucket of the first non-whitespace character of `text`.
    pub fn of(text: &str) -> Option<Self> {
        text.trim_start().chars().next().map(Self::from_char)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Letter(c) => write!(f, "{}", c),
            BucketKey::Digit => f.write_str("digit"),
            BucketKey::Symbol => f.write_str("symbol"),
        }
    }
}

impl FromStr for BucketKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "digit" => return Ok(BucketKey::Digit),
            "symbol" => return Ok(BucketKey::Symbol),
            _ => {}
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(BucketKey::from_char(c)),
            _ => Err(format!("invalid bucket key '{}'", s)),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BucketKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
}

/// Ranked results of one query, tagged with the query's sequence number.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct QueryResponse {
    pub seq: u64,
    pub query: String,
    pub entries: Vec<SearchEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<crate::diagnostics::Diagnostic>,
}

impl QueryResponse {
    pub fn empty(seq: u64, query: impl Into<String>) -> Self {
        Self {
            seq,
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Ready(QueryResponse),
    /// A newer query was issued before this one resolved; its results are dropped.
    Superseded { seq: u64 },
}

impl SearchOutcome {
    pub fn into_response(self) -> Option<QueryResponse> {
        match self {
            SearchOutcome::Ready(response) => Some(response),
            SearchOutcome::Superseded { .. } => None,
        }
    }
}
