use async_trait::async_trait;
use docscope_api::{
    BucketKey, Diagnostic, EntryKind, MatchTier, SearchEntry, SearchOutcome, ShardError,
    ShardSource, Target,
};
use docscope_core::search::{MemoryShardSource, SearchIndex, fold, match_tier};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

fn entry(label: &str, kind: EntryKind) -> SearchEntry {
    SearchEntry::new(label, kind, Target::from_url(&format!("{}.html", label)))
}

fn corpus() -> Vec<SearchEntry> {
    vec![
        entry("Mock", EntryKind::Class),
        entry("MockSettings", EntryKind::Class),
        entry("ModernCpp", EntryKind::Section),
        entry("mock_for", EntryKind::Function),
        entry("MIMICPP_SCOPED_EXPECTATION", EntryKind::Macro),
        entry("matches", EntryKind::Function),
        entry("Sequence", EntryKind::Class),
        entry("SequenceConfig", EntryKind::Class),
        entry("ScopedSequence", EntryKind::Class),
        entry("sequence", EntryKind::Namespace),
        entry("1st_step", EntryKind::Section),
        entry("_internal", EntryKind::Variable),
    ]
}

/// Counts fetches and holds each one until the test releases the gate.
struct GatedSource {
    inner: MemoryShardSource,
    fetches: AtomicUsize,
    gate: Semaphore,
}

impl GatedSource {
    fn new(entries: Vec<SearchEntry>) -> Self {
        Self {
            inner: MemoryShardSource::from_entries(entries),
            fetches: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShardSource for GatedSource {
    async fn fetch(&self, bucket: BucketKey) -> Result<Vec<SearchEntry>, ShardError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ShardError::fetch(bucket, e))?;
        self.inner.fetch(bucket).await
    }
}

/// Fails the first `failures` fetches, then serves from memory.
struct FlakySource {
    inner: MemoryShardSource,
    failures: AtomicUsize,
    fetches: AtomicUsize,
}

#[async_trait]
impl ShardSource for FlakySource {
    async fn fetch(&self, bucket: BucketKey) -> Result<Vec<SearchEntry>, ShardError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ShardError::fetch(bucket, "connection reset"));
        }
        self.inner.fetch(bucket).await
    }
}

#[tokio::test]
async fn test_concurrent_queries_share_one_fetch() {
    let source = Arc::new(GatedSource::new(corpus()));
    let index = SearchIndex::new(source.clone());

    let (first, second, _) = tokio::join!(index.query("mock"), index.query("mo"), async {
        source.gate.add_permits(8);
    });

    assert_eq!(source.fetches(), 1);
    assert!(matches!(first, SearchOutcome::Superseded { seq: 1 }));

    let second = second.into_response().expect("latest query is delivered");
    assert_eq!(second.seq, 2);
    assert_eq!(second.entries.len(), 4);

    index.query("ma").await;
    assert_eq!(source.fetches(), 1);
    assert_eq!(index.loaded_buckets(), vec![BucketKey::Letter('m')]);
}

#[tokio::test]
async fn test_stale_query_across_buckets_is_discarded() {
    let source = Arc::new(GatedSource::new(corpus()));
    let index = SearchIndex::new(source.clone());

    let (slow, fast, _) = tokio::join!(index.query("seq"), index.query("mock"), async {
        source.gate.add_permits(8);
    });

    assert!(slow.into_response().is_none());
    let fast = fast.into_response().unwrap();
    assert_eq!(fast.entries[0].label, "Mock");
    assert_eq!(index.latest_seq(), 2);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_retried_on_next_query() {
    let source = Arc::new(FlakySource {
        inner: MemoryShardSource::from_entries(corpus()),
        failures: AtomicUsize::new(1),
        fetches: AtomicUsize::new(0),
    });
    let index = SearchIndex::new(source.clone());

    let failed = index.query("mock").await.into_response().unwrap();
    assert!(failed.entries.is_empty());
    assert!(matches!(
        failed.diagnostics.as_slice(),
        [Diagnostic::FetchFailed { bucket: BucketKey::Letter('m'), .. }]
    ));
    assert!(index.loaded_buckets().is_empty());

    let retried = index.query("mock").await.into_response().unwrap();
    assert!(retried.diagnostics.is_empty());
    assert_eq!(retried.entries[0].label, "Mock");
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_shard_is_not_fetched_twice() {
    let source = Arc::new(FlakySource {
        inner: MemoryShardSource::from_entries(corpus()),
        failures: AtomicUsize::new(0),
        fetches: AtomicUsize::new(0),
    });
    let index = SearchIndex::new(source.clone());

    for _ in 0..3 {
        let response = index.query("zz").await.into_response().unwrap();
        assert_eq!(
            response.diagnostics,
            vec![Diagnostic::ShardNotFound {
                bucket: BucketKey::Letter('z')
            }]
        );
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reload_replaces_previous_entries() {
    let source = Arc::new(MemoryShardSource::from_entries(corpus()));
    let index = SearchIndex::new(source.clone());
    let bucket = BucketKey::Letter('m');

    let before = index.load(bucket).await.unwrap();
    assert_eq!(before.entries.len(), 6);

    source.insert(bucket, vec![entry("Matcher", EntryKind::Concept)]);
    assert_eq!(index.load(bucket).await.unwrap().generation, before.generation);

    let after = index.reload(bucket).await.unwrap();
    assert!(after.generation > before.generation);

    let response = index.query("m").await.into_response().unwrap();
    let labels: Vec<_> = response.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Matcher"]);
}

#[tokio::test]
async fn test_evict_forces_refetch() {
    let source = Arc::new(GatedSource::new(corpus()));
    source.gate.add_permits(8);
    let index = SearchIndex::new(source.clone());

    index.query("mock").await;
    assert!(index.evict(BucketKey::Letter('m')));
    assert!(!index.evict(BucketKey::Letter('m')));
    index.query("mock").await;
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_digit_and_symbol_buckets() {
    let index = SearchIndex::new(Arc::new(MemoryShardSource::from_entries(corpus())));

    let digit = index.query("1st").await.into_response().unwrap();
    assert_eq!(digit.entries[0].label, "1st_step");

    let symbol = index.query("_int").await.into_response().unwrap();
    assert_eq!(symbol.entries[0].label, "_internal");
}

#[tokio::test]
async fn test_results_always_contain_query_and_respect_tiers() {
    let index = SearchIndex::new(Arc::new(MemoryShardSource::from_entries(corpus())));

    for query in ["m", "mo", "MOCK", "mock_", "s", "seq", "Sequence", "sc", "x"] {
        let needle = fold(query);
        let response = index.query(query).await.into_response().unwrap();

        let tiers: Vec<MatchTier> = response
            .entries
            .iter()
            .map(|e| match_tier(&e.label, &needle).expect("every result matches"))
            .collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]), "tiers out of order for {query}");
        assert!(
            response
                .entries
                .iter()
                .all(|e| fold(&e.label).contains(&needle))
        );
    }
}

#[tokio::test]
async fn test_exact_match_ranks_first() {
    let index = SearchIndex::new(Arc::new(MemoryShardSource::from_entries(corpus())));
    let response = index.query("sequence").await.into_response().unwrap();
    let labels: Vec<_> = response.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Sequence", "sequence", "SequenceConfig", "ScopedSequence"]
    );
}
