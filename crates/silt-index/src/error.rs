/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The specified path is not tracked by the index.
    #[error("path not found in index: {0}")]
    PathNotFound(String),

    /// Store operation failed while loading or saving.
    #[error("store error: {0}")]
    Store(#[from] silt_store::StoreError),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
