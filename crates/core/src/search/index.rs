use super::matcher::{fold, rank};
use async_trait::async_trait;
use dashmap::DashMap;
use docscope_api::{
    ApiResult, BucketKey, Diagnostic, MatchTier, QueryResponse, SearchEntry, SearchOutcome,
    SearchService, ShardError, ShardSource,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Default cap on ranked results per query.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Contents of one bucket as of one load.
#[derive(Debug)]
pub struct Shard {
    pub bucket: BucketKey,
    pub entries: Vec<SearchEntry>,
    /// Rows the source skipped while reading this shard.
    pub diagnostics: Vec<Diagnostic>,
    /// Increases with every load issued by the owning index.
    pub generation: u64,
}

type LoadResult = Result<Arc<Shard>, ShardError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Lazily loaded, sharded search index.
///
/// Each bucket maps to one shared load. Concurrent callers for a bucket await
/// the same load, so a bucket is fetched at most once until it is reloaded,
/// evicted or its fetch fails. A missing shard is remembered as missing.
pub struct SearchIndex {
    source: Arc<dyn ShardSource>,
    loads: DashMap<BucketKey, SharedLoad>,
    latest_seq: AtomicU64,
    generation: AtomicU64,
    max_results: usize,
}

impl SearchIndex {
    pub fn new(source: Arc<dyn ShardSource>) -> Self {
        Self {
            source,
            loads: DashMap::new(),
            latest_seq: AtomicU64::new(0),
            generation: AtomicU64::new(0),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Shard for `bucket`, fetching it on first use.
    pub async fn load(&self, bucket: BucketKey) -> LoadResult {
        let shared = self
            .loads
            .entry(bucket)
            .or_insert_with(|| self.start_load(bucket))
            .clone();
        self.settle(bucket, shared).await
    }

    /// Fetch `bucket` again. The new contents replace the old ones entirely.
    pub async fn reload(&self, bucket: BucketKey) -> LoadResult {
        self.source.invalidate(bucket).await;
        let shared = self.start_load(bucket);
        self.loads.insert(bucket, shared.clone());
        self.settle(bucket, shared).await
    }

    /// Replace `bucket` with `entries` without going through the source.
    pub fn install(&self, bucket: BucketKey, entries: Vec<SearchEntry>) -> Arc<Shard> {
        let shard = Arc::new(Shard {
            bucket,
            entries,
            diagnostics: Vec::new(),
            generation: self.next_generation(),
        });
        let ready: SharedLoad = futures::future::ready(Ok(Arc::clone(&shard)))
            .boxed()
            .shared();
        self.loads.insert(bucket, ready);
        shard
    }

    /// Forget `bucket`; the next query fetches it again.
    pub fn evict(&self, bucket: BucketKey) -> bool {
        self.loads.remove(&bucket).is_some()
    }

    /// Buckets whose shard finished loading successfully.
    pub fn loaded_buckets(&self) -> Vec<BucketKey> {
        let mut buckets: Vec<BucketKey> = self
            .loads
            .iter()
            .filter(|slot| matches!(slot.value().peek(), Some(Ok(_))))
            .map(|slot| *slot.key())
            .collect();
        buckets.sort();
        buckets
    }

    /// Sequence number of the most recently issued query.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq.load(Ordering::SeqCst)
    }

    /// Rank entries matching `query`.
    ///
    /// Takes a fresh sequence number before any shard is touched. If another
    /// query is issued while this one waits for its shard, the outcome is
    /// `Superseded` and the entries are dropped.
    pub async fn query(&self, query: &str) -> SearchOutcome {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let needle = fold(query);

        let Some(bucket) = bucket_of(&needle) else {
            return SearchOutcome::Ready(QueryResponse::empty(seq, query));
        };

        let mut response = QueryResponse::empty(seq, query);
        match self.load(bucket).await {
            Ok(shard) => {
                response.entries =
                    rank(&shard.entries, &needle, MatchTier::Substring, self.max_results);
                response.diagnostics.extend(shard.diagnostics.iter().cloned());
            }
            Err(err) => response.diagnostics.push(err.into()),
        }

        if self.latest_seq() != seq {
            debug!("{}", Diagnostic::StaleQueryDiscarded { seq });
            return SearchOutcome::Superseded { seq };
        }

        debug!(
            "query #{} '{}' -> {} results",
            seq,
            query,
            response.entries.len()
        );
        SearchOutcome::Ready(response)
    }

    /// Distinct labels equal to or starting with `prefix`, best first.
    /// Does not take a sequence number.
    pub async fn complete(&self, prefix: &str, limit: usize) -> Vec<String> {
        let needle = fold(prefix);
        let Some(bucket) = bucket_of(&needle) else {
            return Vec::new();
        };
        let Ok(shard) = self.load(bucket).await else {
            return Vec::new();
        };

        let mut labels: Vec<String> = Vec::new();
        for entry in rank(&shard.entries, &needle, MatchTier::Prefix, usize::MAX) {
            if labels.len() >= limit {
                break;
            }
            if !labels.contains(&entry.label) {
                labels.push(entry.label);
            }
        }
        labels
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn start_load(&self, bucket: BucketKey) -> SharedLoad {
        let source = Arc::clone(&self.source);
        let generation = self.next_generation();
        let load: BoxFuture<'static, LoadResult> = async move {
            debug!("fetching shard '{}' (generation {})", bucket, generation);
            source
                .fetch_with_diagnostics(bucket)
                .await
                .map(|(entries, diagnostics)| {
                    Arc::new(Shard {
                        bucket,
                        entries,
                        diagnostics,
                        generation,
                    })
                })
        }
        .boxed();
        load.shared()
    }

    /// Await a load and drop it from the cache if the fetch failed, so that a
    /// later user action can try again. Missing shards stay cached.
    async fn settle(&self, bucket: BucketKey, shared: SharedLoad) -> LoadResult {
        let probe = shared.clone();
        let result = shared.await;
        match &result {
            Err(ShardError::NotFound(_)) => debug!("no shard for bucket '{}'", bucket),
            Err(err @ ShardError::Fetch { .. }) => {
                warn!("{}", err);
                self.loads
                    .remove_if(&bucket, |_, current| current.ptr_eq(&probe));
            }
            Ok(_) => {}
        }
        result
    }
}

/// Bucket of a folded query. Blank queries select nothing.
fn bucket_of(needle: &str) -> Option<BucketKey> {
    if needle.trim().is_empty() {
        return None;
    }
    needle.chars().next().map(BucketKey::from_char)
}

#[async_trait]
impl SearchService for SearchIndex {
    async fn search(&self, query: &str) -> ApiResult<SearchOutcome> {
        Ok(self.query(query).await)
    }

    async fn complete(&self, prefix: &str, limit: usize) -> ApiResult<Vec<String>> {
        Ok(SearchIndex::complete(self, prefix, limit).await)
    }
}
