//! The persisted metadata records: per-path entries and the aggregate index.
//!
//! These are pure data. The state-transition rules that produce them live in
//! the VFS core, where each transition is a `match` over [`EntryState`].

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use silt_types::ContentSha;

/// How a tracked path relates to the base snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Identical to the base snapshot; no workspace bytes exist.
    Base,
    /// Created locally; the path has no base counterpart.
    Added,
    /// Base exists and the workspace holds different bytes.
    Modified,
    /// Locally deleted; kept as a tombstone until a push confirms it.
    Deleted,
    /// A pull found local and remote edits that disagree.
    Conflict,
}

/// Per-path metadata record.
///
/// Stored both inside the aggregate [`IndexFile`] and split per-path into
/// the `info` segment for enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    pub state: EntryState,
    /// Sha of the base bytes, when a base snapshot holds this path.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub base_sha: Option<ContentSha>,
    /// Sha of the workspace bytes, when the path has local edits.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub workspace_sha: Option<ContentSha>,
    /// Sha of the remote bytes seen at last pull; carried while conflicted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub remote_sha: Option<ContentSha>,
    /// Wall-clock milliseconds of the last mutation.
    pub updated_at_ms: u64,
}

impl IndexEntry {
    /// An entry tracking a path identical to base.
    pub fn base(path: impl Into<String>, base_sha: ContentSha) -> Self {
        Self {
            path: path.into(),
            state: EntryState::Base,
            base_sha: Some(base_sha),
            workspace_sha: None,
            remote_sha: None,
            updated_at_ms: now_ms(),
        }
    }

    /// An entry for a locally created path.
    pub fn added(path: impl Into<String>, workspace_sha: ContentSha) -> Self {
        Self {
            path: path.into(),
            state: EntryState::Added,
            base_sha: None,
            workspace_sha: Some(workspace_sha),
            remote_sha: None,
            updated_at_ms: now_ms(),
        }
    }

    /// Refresh the mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at_ms = now_ms();
    }

    /// Tombstones are hidden from path listings but survive until pushed.
    pub fn is_tombstone(&self) -> bool {
        self.state == EntryState::Deleted
    }

    /// Whether this entry contributes an action to the change set.
    pub fn is_dirty(&self) -> bool {
        matches!(
            self.state,
            EntryState::Added | EntryState::Modified | EntryState::Deleted
        )
    }
}

/// The aggregate index: the VFS's authoritative state.
///
/// `head` names the remote commit the `base` segment reflects. The index is
/// persisted under the literal key `index` and written after all data
/// segments, so a crash rolls back to the last durable index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default)]
    pub head: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_commit_key: Option<String>,
    #[serde(default)]
    pub entries: BTreeMap<String, IndexEntry>,
}

impl IndexFile {
    /// An empty index tracking no remote commit.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
