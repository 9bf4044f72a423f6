use crate::reader::{self, text::search_key_text};
use async_trait::async_trait;
use docscope_api::{BucketKey, Diagnostic, SearchEntry, ShardError, ShardSource};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// First quoted string after an opening bracket: the key of a shard's first row.
static FIRST_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[\s*['"]([^'"]*)['"]"#).expect("valid regex"));

/// Manifest listing the leading character of each `all_<hex>.js` file by position.
const MANIFEST_FILE: &str = "searchdata.js";
const MANIFEST_TABLE: &str = "indexSectionsWithContent";

/// Shards held in memory. `insert` replaces a bucket wholesale.
#[derive(Default)]
pub struct MemoryShardSource {
    shards: RwLock<HashMap<BucketKey, Vec<SearchEntry>>>,
}

impl MemoryShardSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `entries` into buckets by the leading character of their label.
    pub fn from_entries(entries: impl IntoIterator<Item = SearchEntry>) -> Self {
        let source = Self::new();
        {
            let mut shards = source.shards.write().unwrap_or_else(|e| e.into_inner());
            for entry in entries {
                if let Some(bucket) = BucketKey::of(&entry.label) {
                    shards.entry(bucket).or_default().push(entry);
                }
            }
        }
        source
    }

    pub fn insert(&self, bucket: BucketKey, entries: Vec<SearchEntry>) {
        let mut shards = self.shards.write().unwrap_or_else(|e| e.into_inner());
        shards.insert(bucket, entries);
    }

    pub fn remove(&self, bucket: BucketKey) {
        let mut shards = self.shards.write().unwrap_or_else(|e| e.into_inner());
        shards.remove(&bucket);
    }
}

#[async_trait]
impl ShardSource for MemoryShardSource {
    async fn fetch(&self, bucket: BucketKey) -> Result<Vec<SearchEntry>, ShardError> {
        let shards = self.shards.read().unwrap_or_else(|e| e.into_inner());
        shards
            .get(&bucket)
            .cloned()
            .ok_or(ShardError::NotFound(bucket))
    }
}

/// Which files make up each bucket of a search directory.
#[derive(Debug, Clone, Default)]
pub struct ShardCatalog {
    files: BTreeMap<BucketKey, Vec<PathBuf>>,
}

impl ShardCatalog {
    pub fn files_for(&self, bucket: BucketKey) -> &[PathBuf] {
        self.files.get(&bucket).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Shards stored in a generated site's search directory.
///
/// `all_<hex>.js` files are assigned to buckets by their leading character,
/// taken from `searchdata.js` when present and otherwise from each file's first
/// key. When two files carry the same character, the higher file number wins.
/// A `<bucket>.json` file (`m.json`, `digit.json`, `symbol.json`) replaces the
/// generated files of its bucket.
///
/// The directory is listed on first use and again after every
/// [`ShardSource::invalidate`], so a reload sees files added since.
pub struct DirShardSource {
    dir: PathBuf,
    catalog: tokio::sync::RwLock<Option<Arc<ShardCatalog>>>,
}

impl DirShardSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            catalog: tokio::sync::RwLock::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn catalog(&self) -> Arc<ShardCatalog> {
        if let Some(catalog) = self.catalog.read().await.as_ref() {
            return Arc::clone(catalog);
        }
        let mut slot = self.catalog.write().await;
        if let Some(catalog) = slot.as_ref() {
            return Arc::clone(catalog);
        }
        let catalog = Arc::new(build_catalog(&self.dir).await);
        *slot = Some(Arc::clone(&catalog));
        catalog
    }
}

#[async_trait]
impl ShardSource for DirShardSource {
    async fn fetch(&self, bucket: BucketKey) -> Result<Vec<SearchEntry>, ShardError> {
        self.fetch_with_diagnostics(bucket)
            .await
            .map(|(entries, _)| entries)
    }

    async fn fetch_with_diagnostics(
        &self,
        bucket: BucketKey,
    ) -> Result<(Vec<SearchEntry>, Vec<Diagnostic>), ShardError> {
        let catalog = self.catalog().await;
        let files = catalog.files_for(bucket);
        if files.is_empty() {
            return Err(ShardError::NotFound(bucket));
        }

        let mut entries = Vec::new();
        let mut diagnostics = Vec::new();
        for path in files {
            let src = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ShardError::fetch(bucket, format!("{}: {}", path.display(), e)))?;
            let context = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parsed = if is_json(path) {
                reader::read_json_shard(&src, &context)
            } else {
                reader::read_search_file(&src, &context)
            };
            let (mut file_entries, mut skipped) =
                parsed.map_err(|e| ShardError::fetch(bucket, format!("{}: {}", context, e)))?;
            entries.append(&mut file_entries);
            diagnostics.append(&mut skipped);
        }

        debug!(
            "loaded {} entries for bucket '{}' ({} rows skipped)",
            entries.len(),
            bucket,
            diagnostics.len()
        );
        Ok((entries, diagnostics))
    }

    async fn invalidate(&self, bucket: BucketKey) {
        if self.catalog.write().await.take().is_some() {
            debug!("rescanning {} for bucket '{}'", self.dir.display(), bucket);
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Number of a generated `all_<hex>.js` file.
fn generated_file_number(name: &str) -> Option<u32> {
    let hex = name.strip_prefix("all_")?.strip_suffix(".js")?;
    u32::from_str_radix(hex, 16).ok()
}

async fn build_catalog(dir: &Path) -> ShardCatalog {
    let mut generated: Vec<(u32, PathBuf)> = Vec::new();
    let mut json: BTreeMap<BucketKey, PathBuf> = BTreeMap::new();

    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) => {
            warn!("search directory {} unavailable: {}", dir.display(), e);
            return ShardCatalog::default();
        }
    };

    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("failed to list {}: {}", dir.display(), e);
                break;
            }
        };
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };

        if let Some(number) = generated_file_number(&name) {
            generated.push((number, path));
        } else if is_json(&path) {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match stem.parse::<BucketKey>() {
                Ok(bucket) => {
                    json.insert(bucket, path);
                }
                Err(_) => debug!("ignoring {} in search directory", name),
            }
        }
    }
    generated.sort();

    let manifest = read_manifest(dir).await;
    let mut by_char: BTreeMap<char, (u32, PathBuf)> = BTreeMap::new();

    for (number, path) in generated {
        let leading = match &manifest {
            Some(chars) => chars.get(number as usize).copied(),
            None => leading_char(&path).await,
        };
        let Some(c) = leading else {
            warn!("cannot tell which bucket {} belongs to", path.display());
            continue;
        };
        if let Some((previous, old)) = by_char.insert(c, (number, path.clone())) {
            debug!(
                "{} supersedes {} for '{}' (file {} over {})",
                path.display(),
                old.display(),
                c,
                number,
                previous
            );
        }
    }

    let mut files: BTreeMap<BucketKey, Vec<PathBuf>> = BTreeMap::new();
    for (c, (_, path)) in by_char {
        files.entry(BucketKey::from_char(c)).or_default().push(path);
    }
    for (bucket, path) in json {
        files.insert(bucket, vec![path]);
    }

    info!(
        "search catalog for {}: {} buckets",
        dir.display(),
        files.len()
    );
    ShardCatalog { files }
}

async fn read_manifest(dir: &Path) -> Option<Vec<char>> {
    let path = dir.join(MANIFEST_FILE);
    let src = tokio::fs::read_to_string(&path).await.ok()?;
    match reader::find_table(&src, MANIFEST_TABLE) {
        Ok(table) => table
            .get("0")
            .and_then(|v| v.as_str())
            .map(|s| s.chars().collect()),
        Err(e) => {
            warn!("ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

async fn leading_char(path: &Path) -> Option<char> {
    let file = tokio::fs::File::open(path).await.ok()?;
    let mut lines = BufReader::new(file).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(caps) = FIRST_KEY.captures(&line) {
            return search_key_text(&caps[1]).chars().next();
        }
    }
    None
}
