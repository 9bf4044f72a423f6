use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not a documentation site: {}", .0.display())]
    SiteNotFound(std::path::PathBuf),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DocscopeError> for docscope_api::ApiError {
    fn from(err: DocscopeError) -> Self {
        match err {
            DocscopeError::SiteNotFound(_) => docscope_api::ApiError::NotFound(err.to_string()),
            _ => docscope_api::ApiError::Internal(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocscopeError>;
