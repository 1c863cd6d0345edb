/// Errors from VFS operations.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// The push's parent does not match the local head; the remote was not
    /// touched. Pull first.
    #[error("head mismatch: parent {given:?} does not match local head {local:?}")]
    HeadMismatch { given: String, local: String },

    /// A push was attempted while paths are still conflicted.
    #[error("unresolved conflicts: {}", .0.join(", "))]
    UnresolvedConflicts(Vec<String>),

    /// Rename source has neither workspace nor base content.
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// A conflict operation targeted a path that is not conflicted.
    #[error("path is not in conflict: {0}")]
    NotInConflict(String),

    /// A dirty entry's workspace bytes are missing from storage.
    #[error("workspace content missing for {0}")]
    MissingContent(String),

    /// A remote operation was requested but no adapter is configured.
    #[error("no remote adapter configured")]
    NoRemote,

    /// Backend I/O failure, reported verbatim.
    #[error(transparent)]
    Store(#[from] silt_store::StoreError),

    #[error(transparent)]
    Index(#[from] silt_index::IndexError),

    /// Remote failure after the retry budget was spent, or a terminal one.
    #[error(transparent)]
    Remote(#[from] silt_remote::RemoteError),
}

/// Result alias for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;
