//! Operation inputs and outcomes for the VFS.

use silt_types::{Change, ContentSha};

/// One path a pull could not auto-merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictInfo {
    pub path: String,
    /// Sha of the remote bytes persisted to the conflict segment; `None`
    /// when the conflict is a remote deletion.
    pub remote_sha: Option<ContentSha>,
}

/// Result of a pull.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PullOutcome {
    /// The remote head the base segment now reflects.
    pub head: String,
    /// Paths whose bytes were taken from the remote (into base or conflict).
    pub fetched_paths: Vec<String>,
    /// Paths left in the conflict state.
    pub conflicts: Vec<ConflictInfo>,
}

impl PullOutcome {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Input to a push.
#[derive(Clone, Debug)]
pub struct PushRequest {
    pub message: String,
    /// Must equal the local head; gates against pushing over unseen
    /// remote commits.
    pub parent_sha: String,
    /// Explicit change set; computed from the index when `None`.
    pub changes: Option<Vec<Change>>,
}

impl PushRequest {
    pub fn new(message: impl Into<String>, parent_sha: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            parent_sha: parent_sha.into(),
            changes: None,
        }
    }
}

/// Result of a push.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushOutcome {
    /// The remote commit the local head now names. For a no-op push this is
    /// the unchanged parent.
    pub commit_sha: String,
    /// `true` when the change set was empty and the remote was not called.
    pub noop: bool,
}

/// How to settle one conflicted path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Keep the local bytes (or local deletion); the remote side still
    /// becomes the new merge base.
    KeepWorkspace,
    /// Discard the local side and accept what the remote has.
    TakeRemote,
}
