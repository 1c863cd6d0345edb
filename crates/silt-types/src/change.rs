//! The change-set vocabulary: create/update/delete actions against a remote.

use serde::{Deserialize, Serialize};

/// What a single change does to its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    /// The wire name used by the hosting providers' commit APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// One action in a commit's change set.
///
/// `content` is present for creates and updates once materialized; a change
/// set projected straight from the index carries `None` until the push path
/// reads the workspace bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Change {
    pub fn create(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Create,
            path: path.into(),
            content: Some(content.into()),
        }
    }

    pub fn update(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Update,
            path: path.into(),
            content: Some(content.into()),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            path: path.into(),
            content: None,
        }
    }
}

/// Order a change set for commit: lexicographically by path, with the
/// delete sorting before a create/update at the same path so a path can be
/// torn down and recreated within one commit.
pub fn sort_for_commit(changes: &mut [Change]) {
    changes.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| (a.kind != ChangeKind::Delete).cmp(&(b.kind != ChangeKind::Delete)))
    });
}
