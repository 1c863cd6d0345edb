use std::collections::BTreeMap;

use async_trait::async_trait;
use silt_types::Change;

use crate::error::RemoteResult;

/// A branch's state as read from the remote: head commit id plus the full
/// file contents of its tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub head: String,
    pub files: BTreeMap<String, String>,
}

impl RemoteSnapshot {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

/// Adapter interface for a remote hosting provider.
///
/// Providers differ in how a commit is assembled (GitLab applies actions
/// natively; GitHub builds blobs and trees), but both reduce to this
/// capability set. Implementations must not retry internally -- callers
/// wrap these operations in [`crate::with_retry`] with their own policy.
#[async_trait]
pub trait RemoteAdapter: Send + Sync {
    /// Read the branch head and every file reachable from its tree.
    async fn fetch_snapshot(&self, branch: &str) -> RemoteResult<RemoteSnapshot>;

    /// Apply `changes` as one commit on `branch`, returning the new commit
    /// id. The server rejects the commit rather than mutating anything if
    /// the branch has moved in a way that invalidates an action.
    async fn create_commit_with_actions(
        &self,
        branch: &str,
        message: &str,
        changes: &[Change],
    ) -> RemoteResult<String>;

    /// Point `branch` at `commit_sha`. Providers whose commit operation
    /// already moves the ref treat this as a no-op.
    async fn update_ref(&self, branch: &str, commit_sha: &str) -> RemoteResult<()>;

    /// The branch this adapter was configured to track.
    fn branch(&self) -> &str;
}
