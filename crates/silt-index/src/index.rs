//! The in-memory index manager.
//!
//! [`Index`] wraps an [`IndexFile`] and mediates every read and write of it.
//! It is purely in-memory; persistence goes through a `StorageBackend`, with
//! the per-path records written before the aggregate so a crash rolls back
//! to the last durable aggregate.

use std::collections::BTreeMap;

use silt_store::{EntryState, IndexEntry, IndexFile, Segment, StorageBackend};
use silt_types::{sort_for_commit, Change, ChangeKind};

use crate::error::{IndexError, IndexResult};

/// The in-memory projection of the index file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    file: IndexFile,
}

impl Index {
    /// An empty index tracking no remote commit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a backend.
    ///
    /// A missing or unparseable index resets to empty: local state can
    /// always be rebuilt from the remote, so a torn index is survivable.
    pub fn load(backend: &dyn StorageBackend) -> Self {
        match backend.read_index() {
            Ok(Some(file)) => Self { file },
            Ok(None) => Self::new(),
            Err(e) => {
                tracing::warn!("index unreadable, resetting to empty: {e}");
                Self::new()
            }
        }
    }

    /// Persist the index: per-path records first, the aggregate last.
    ///
    /// Stale per-path records (paths no longer tracked) are pruned so the
    /// `info` segment always enumerates exactly the tracked paths.
    pub fn save(&self, backend: &dyn StorageBackend) -> IndexResult<()> {
        for listing in backend.list_files(None, Some(Segment::Info), true)? {
            if !self.file.entries.contains_key(&listing.path) {
                backend.delete_entry(&listing.path)?;
            }
        }
        for entry in self.file.entries.values() {
            backend.write_entry(entry)?;
        }
        backend.write_index(&self.file)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Head tracking
    // ---------------------------------------------------------------

    /// The remote commit id the base segment reflects (empty until a pull).
    pub fn head(&self) -> &str {
        &self.file.head
    }

    pub fn set_head(&mut self, head: impl Into<String>) {
        self.file.head = head.into();
    }

    /// The commit id produced by the most recent successful push.
    pub fn last_commit_key(&self) -> Option<&str> {
        self.file.last_commit_key.as_deref()
    }

    pub fn set_last_commit_key(&mut self, key: impl Into<String>) {
        self.file.last_commit_key = Some(key.into());
    }

    // ---------------------------------------------------------------
    // Entry access
    // ---------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.file.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut IndexEntry> {
        self.file.entries.get_mut(path)
    }

    /// Insert or replace the record for `entry.path`.
    pub fn insert(&mut self, entry: IndexEntry) {
        self.file.entries.insert(entry.path.clone(), entry);
    }

    /// Drop the record for `path`.
    pub fn remove(&mut self, path: &str) -> IndexResult<IndexEntry> {
        self.file
            .entries
            .remove(path)
            .ok_or_else(|| IndexError::PathNotFound(path.to_string()))
    }

    /// All tracked records, keyed by path.
    pub fn entries(&self) -> &BTreeMap<String, IndexEntry> {
        &self.file.entries
    }

    /// All tracked paths, including tombstones.
    pub fn tracked_paths(&self) -> Vec<String> {
        self.file.entries.keys().cloned().collect()
    }

    /// The user-visible paths: everything except tombstones.
    pub fn visible_paths(&self) -> Vec<String> {
        self.file
            .entries
            .values()
            .filter(|e| !e.is_tombstone())
            .map(|e| e.path.clone())
            .collect()
    }

    // ---------------------------------------------------------------
    // Conflict queries
    // ---------------------------------------------------------------

    /// Returns `true` if any entry is in an unresolved conflict.
    pub fn has_conflicts(&self) -> bool {
        self.file
            .entries
            .values()
            .any(|e| e.state == EntryState::Conflict)
    }

    /// Paths with unresolved conflicts.
    pub fn conflict_paths(&self) -> Vec<String> {
        self.file
            .entries
            .values()
            .filter(|e| e.state == EntryState::Conflict)
            .map(|e| e.path.clone())
            .collect()
    }

    // ---------------------------------------------------------------
    // Change-set projection
    // ---------------------------------------------------------------

    /// Project the pending commit actions from the tracked records.
    ///
    /// Pure over the in-memory entries: content is left unmaterialized
    /// (`None`) for the push path to fill from the workspace. Ordered
    /// lexicographically by path, deletes first at equal paths.
    pub fn change_set(&self) -> Vec<Change> {
        let mut changes: Vec<Change> = self
            .file
            .entries
            .values()
            .filter_map(|e| {
                let kind = match e.state {
                    EntryState::Added => ChangeKind::Create,
                    EntryState::Modified => ChangeKind::Update,
                    EntryState::Deleted => ChangeKind::Delete,
                    EntryState::Base | EntryState::Conflict => return None,
                };
                Some(Change {
                    kind,
                    path: e.path.clone(),
                    content: None,
                })
            })
            .collect();
        sort_for_commit(&mut changes);
        changes
    }

    /// Consume the manager, yielding the underlying file.
    pub fn into_file(self) -> IndexFile {
        self.file
    }
}

impl From<IndexFile> for Index {
    fn from(file: IndexFile) -> Self {
        Self { file }
    }
}
