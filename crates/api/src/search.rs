use crate::diagnostics::{Diagnostic, ShardError};
use crate::error::ApiResult;
use crate::models::{BucketKey, SearchEntry, SearchOutcome};
use async_trait::async_trait;

/// Where search shards come from.
///
/// Every call returns the complete current contents of the bucket's shard;
/// callers replace whatever they held for that bucket with the result.
#[async_trait]
pub trait ShardSource: Send + Sync {
    /// Fetch the full shard for `bucket`.
    ///
    /// Returns `ShardError::NotFound` when the bucket has no shard at all,
    /// which callers treat as an empty result rather than a failure.
    async fn fetch(&self, bucket: BucketKey) -> Result<Vec<SearchEntry>, ShardError>;

    /// Like [`ShardSource::fetch`], also returning the rows that were skipped
    /// while reading the shard.
    async fn fetch_with_diagnostics(
        &self,
        bucket: BucketKey,
    ) -> Result<(Vec<SearchEntry>, Vec<Diagnostic>), ShardError> {
        Ok((self.fetch(bucket).await?, Vec::new()))
    }

    /// Drop anything remembered about where `bucket` lives, so the next fetch
    /// sees the source as it is now. Called before a reload.
    async fn invalidate(&self, _bucket: BucketKey) {}
}

/// Search-box queries against the sharded index.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Rank entries matching `query`.
    ///
    /// Each call takes a new sequence number. If a newer call is issued before
    /// this one resolves, the result is `SearchOutcome::Superseded` and the
    /// entries are dropped.
    async fn search(&self, query: &str) -> ApiResult<SearchOutcome>;

    /// Distinct labels that equal or start with `prefix`, for completion menus.
    async fn complete(&self, prefix: &str, limit: usize) -> ApiResult<Vec<String>>;
}
