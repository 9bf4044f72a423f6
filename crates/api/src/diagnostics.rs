use crate::models::{BucketKey, NodeRef};
use serde::{Deserialize, Serialize};

/// Non-fatal conditions raised while loading or assembling generated data.
/// None of these surface to the end user as an error; each one only means
/// fewer results or less tree expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("no shard for bucket '{bucket}'")]
    ShardNotFound { bucket: BucketKey },
    #[error("failed to fetch shard for bucket '{bucket}': {reason}")]
    FetchFailed { bucket: BucketKey, reason: String },
    #[error("malformed entry in {context}: {reason}")]
    MalformedEntry { context: String, reason: String },
    #[error("cycle detected, dropped edge {parent} -> {child}")]
    CycleDetected { child: NodeRef, parent: NodeRef },
    #[error("query #{seq} superseded by a newer query")]
    StaleQueryDiscarded { seq: u64 },
}

impl Diagnostic {
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Diagnostic::MalformedEntry {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single shard fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShardError {
    #[error("no shard for bucket '{0}'")]
    NotFound(BucketKey),
    #[error("failed to fetch shard for bucket '{bucket}': {reason}")]
    Fetch { bucket: BucketKey, reason: String },
}

impl ShardError {
    pub fn fetch(bucket: BucketKey, reason: impl ToString) -> Self {
        ShardError::Fetch {
            bucket,
            reason: reason.to_string(),
        }
    }
}

impl From<ShardError> for Diagnostic {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::NotFound(bucket) => Diagnostic::ShardNotFound { bucket },
            ShardError::Fetch { bucket, reason } => Diagnostic::FetchFailed { bucket, reason },
        }
    }
}
