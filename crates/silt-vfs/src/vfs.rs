//! The VFS state machine.
//!
//! A [`Vfs`] owns one storage backend and, optionally, one remote adapter.
//! Local edits accumulate in the workspace segment; [`Vfs::pull`] reconciles
//! them three-way against a remote snapshot, and [`Vfs::push`] applies the
//! accumulated change set as a single remote commit.
//!
//! Every public operation leaves the index invariants intact and writes the
//! aggregate index last, so a crash mid-operation rolls storage back to the
//! last durable index.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use silt_index::{EntryState, Index, IndexEntry};
use silt_remote::{with_retry, RemoteAdapter, RetryPolicy};
use silt_store::{Segment, StorageBackend};
use silt_types::{Change, ChangeKind, ContentSha};

use crate::error::{VfsError, VfsResult};
use crate::types::{ConflictInfo, ConflictResolution, PullOutcome, PushOutcome, PushRequest};

const DEFAULT_BRANCH: &str = "main";

/// A local workspace tracking divergence from one remote branch.
pub struct Vfs {
    backend: Arc<dyn StorageBackend>,
    remote: Option<Arc<dyn RemoteAdapter>>,
    branch: String,
    retry: RetryPolicy,
    index: Index,
}

impl Vfs {
    /// A VFS over `backend` with no remote configured. Local operations
    /// work; `pull`/`push` fail with [`VfsError::NoRemote`].
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            remote: None,
            branch: DEFAULT_BRANCH.to_string(),
            retry: RetryPolicy::default(),
            index: Index::new(),
        }
    }

    /// Attach a remote adapter; the VFS tracks the adapter's branch.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteAdapter>) -> Self {
        self.branch = remote.branch().to_string();
        self.remote = Some(remote);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Initialize the backend and load the index. A missing or unparseable
    /// index resets to empty. No remote traffic.
    pub fn init(&mut self) -> VfsResult<()> {
        self.backend.init()?;
        self.index = Index::load(self.backend.as_ref());
        Ok(())
    }

    /// The remote commit id the base segment reflects.
    pub fn head(&self) -> &str {
        self.index.head()
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Read-only view of the index, for status displays and tests.
    pub fn index(&self) -> &Index {
        &self.index
    }

    fn persist(&self) -> VfsResult<()> {
        self.index.save(self.backend.as_ref())?;
        Ok(())
    }

    fn remote(&self) -> VfsResult<Arc<dyn RemoteAdapter>> {
        self.remote.clone().ok_or(VfsError::NoRemote)
    }

    // ---------------------------------------------------------------
    // Local reads
    // ---------------------------------------------------------------

    /// The effective content of `path`: workspace if present, else base.
    pub fn read_file(&self, path: &str) -> VfsResult<Option<String>> {
        Ok(self.backend.read_blob(path, None)?)
    }

    /// Read straight through to the workspace segment.
    pub fn read_workspace(&self, path: &str) -> VfsResult<Option<String>> {
        Ok(self.backend.read_blob(path, Some(Segment::Workspace))?)
    }

    /// Read the remote bytes persisted for a conflicted path.
    pub fn read_conflict(&self, path: &str) -> VfsResult<Option<String>> {
        Ok(self.backend.read_blob(path, Some(Segment::Conflict))?)
    }

    /// The user-visible paths: tracked entries minus tombstones.
    pub fn list_paths(&self) -> Vec<String> {
        self.index.visible_paths()
    }

    pub fn has_conflicts(&self) -> bool {
        self.index.has_conflicts()
    }

    pub fn conflict_paths(&self) -> Vec<String> {
        self.index.conflict_paths()
    }

    /// The pending commit actions, unmaterialized. Pure over the index.
    pub fn change_set(&self) -> Vec<Change> {
        self.index.change_set()
    }

    // ---------------------------------------------------------------
    // Local writes
    // ---------------------------------------------------------------

    /// Write `content` at `path` in the workspace.
    pub fn write_file(&mut self, path: &str, content: &str) -> VfsResult<()> {
        let sha = ContentSha::of(content);
        let existing = self.index.get(path).cloned();

        match existing {
            None => {
                self.backend.write_blob(path, content, Segment::Workspace)?;
                self.index.insert(IndexEntry::added(path, sha));
            }
            Some(entry) => match entry.state {
                EntryState::Base => {
                    if entry.base_sha == Some(sha) {
                        return Ok(()); // identical to base: do not dirty
                    }
                    self.backend.write_blob(path, content, Segment::Workspace)?;
                    self.update_entry(path, |e| {
                        e.state = EntryState::Modified;
                        e.workspace_sha = Some(sha);
                    });
                }
                EntryState::Added | EntryState::Modified => {
                    if entry.base_sha == Some(sha) {
                        // The write restored the base bytes: revert.
                        self.backend.delete_blob(path, Some(Segment::Workspace))?;
                        self.update_entry(path, |e| {
                            e.state = EntryState::Base;
                            e.workspace_sha = None;
                        });
                    } else {
                        self.backend.write_blob(path, content, Segment::Workspace)?;
                        self.update_entry(path, |e| {
                            e.workspace_sha = Some(sha);
                        });
                    }
                }
                EntryState::Deleted => {
                    if entry.base_sha == Some(sha) {
                        // Un-tombstoned with the exact base bytes.
                        self.backend.delete_blob(path, Some(Segment::Workspace))?;
                        self.update_entry(path, |e| {
                            e.state = EntryState::Base;
                            e.workspace_sha = None;
                        });
                    } else {
                        self.backend.write_blob(path, content, Segment::Workspace)?;
                        self.update_entry(path, |e| {
                            e.state = EntryState::Modified;
                            e.workspace_sha = Some(sha);
                        });
                    }
                }
                EntryState::Conflict => {
                    // Stays conflicted until resolved; the new bytes become
                    // the local side.
                    self.backend.write_blob(path, content, Segment::Workspace)?;
                    self.update_entry(path, |e| {
                        e.workspace_sha = Some(sha);
                    });
                }
            },
        }
        self.persist()
    }

    /// Delete `path`: tracked base content becomes a tombstone, local-only
    /// content is dropped outright.
    pub fn delete_file(&mut self, path: &str) -> VfsResult<()> {
        let existing = self.index.get(path).cloned();
        let Some(entry) = existing else {
            return Ok(()); // untracked: nothing to delete
        };

        match entry.state {
            EntryState::Deleted => Ok(()), // already a tombstone
            EntryState::Added => {
                self.backend.delete_blob(path, Some(Segment::Workspace))?;
                self.index.remove(path)?;
                self.persist()
            }
            EntryState::Base | EntryState::Modified | EntryState::Conflict => {
                self.backend.delete_blob(path, Some(Segment::Workspace))?;
                self.backend.delete_blob(path, Some(Segment::Conflict))?;
                if entry.base_sha.is_some() {
                    self.update_entry(path, |e| {
                        e.state = EntryState::Deleted;
                        e.workspace_sha = None;
                        e.remote_sha = None;
                    });
                } else {
                    // A conflicted local add has no base to tombstone.
                    self.index.remove(path)?;
                }
                self.persist()
            }
        }
    }

    /// Move `from` to `to`. Appears in the change set as one delete plus
    /// one create.
    pub fn rename(&mut self, from: &str, to: &str) -> VfsResult<()> {
        let content = self
            .backend
            .read_blob(from, None)?
            .ok_or_else(|| VfsError::SourceNotFound(from.to_string()))?;
        self.write_file(to, &content)?;
        self.delete_file(from)
    }

    fn update_entry(&mut self, path: &str, mutate: impl FnOnce(&mut IndexEntry)) {
        if let Some(entry) = self.index.get_mut(path) {
            mutate(entry);
            entry.touch();
        }
    }

    // ---------------------------------------------------------------
    // Base snapshot
    // ---------------------------------------------------------------

    /// Install `snapshot` as the new base layer, preserving local edits.
    ///
    /// Paths missing from the snapshot lose their base blob; entries with
    /// no local modification are dropped entirely.
    pub fn apply_base_snapshot(
        &mut self,
        snapshot: &BTreeMap<String, String>,
        head: &str,
    ) -> VfsResult<()> {
        for (path, content) in snapshot {
            let sha = ContentSha::of(content);
            self.backend.write_blob(path, content, Segment::Base)?;
            match self.index.get(path).cloned() {
                None => self.index.insert(IndexEntry::base(path.clone(), sha)),
                Some(entry) => {
                    let drop_workspace = matches!(
                        entry.state,
                        EntryState::Added | EntryState::Modified
                    ) && entry.workspace_sha == Some(sha);
                    if drop_workspace {
                        self.backend.delete_blob(path, Some(Segment::Workspace))?;
                    }
                    self.update_entry(path, |e| {
                        e.base_sha = Some(sha);
                        match e.state {
                            EntryState::Added | EntryState::Modified => {
                                if drop_workspace {
                                    e.state = EntryState::Base;
                                    e.workspace_sha = None;
                                } else {
                                    e.state = EntryState::Modified;
                                }
                            }
                            // Base stays base; tombstones and conflicts keep
                            // their pending local decision.
                            EntryState::Base | EntryState::Deleted | EntryState::Conflict => {}
                        }
                    });
                }
            }
        }

        for path in self.index.tracked_paths() {
            if snapshot.contains_key(&path) {
                continue;
            }
            let Some(entry) = self.index.get(&path).cloned() else {
                continue;
            };
            if entry.base_sha.is_none() {
                continue; // never had a base to drop
            }
            self.backend.delete_blob(&path, Some(Segment::Base))?;
            match entry.state {
                EntryState::Base | EntryState::Deleted => {
                    self.index.remove(&path)?;
                }
                EntryState::Modified => {
                    self.update_entry(&path, |e| {
                        e.state = EntryState::Added;
                        e.base_sha = None;
                    });
                }
                EntryState::Conflict => {
                    self.update_entry(&path, |e| {
                        e.base_sha = None;
                    });
                }
                EntryState::Added => {}
            }
        }

        self.index.set_head(head);
        self.persist()
    }

    // ---------------------------------------------------------------
    // Pull
    // ---------------------------------------------------------------

    /// Fetch the tracked branch from the remote and reconcile.
    pub async fn pull(&mut self) -> VfsResult<PullOutcome> {
        let remote = self.remote()?;
        let branch = self.branch.clone();
        let snapshot = with_retry(&self.retry, || {
            let remote = Arc::clone(&remote);
            let branch = branch.clone();
            async move { remote.fetch_snapshot(&branch).await }
        })
        .await?;
        self.pull_snapshot(&snapshot.head, &snapshot.files)
    }

    /// Reconcile against an already-fetched snapshot. This is the pure core
    /// of `pull`: three-way per path over {base, workspace, remote}.
    ///
    /// Identical bytes on both sides never produce a conflict, and a remote
    /// side that still matches the base never overrides a local edit.
    /// Re-running the same pull converges on the same state.
    pub fn pull_snapshot(
        &mut self,
        remote_head: &str,
        files: &BTreeMap<String, String>,
    ) -> VfsResult<PullOutcome> {
        let mut fetched_paths = Vec::new();
        let mut conflicts = Vec::new();

        let mut paths: BTreeSet<String> = self.index.tracked_paths().into_iter().collect();
        paths.extend(files.keys().cloned());

        for path in paths {
            match files.get(&path) {
                Some(content) => self.reconcile_present(
                    &path,
                    content,
                    &mut fetched_paths,
                    &mut conflicts,
                )?,
                None => self.reconcile_absent(&path, &mut conflicts)?,
            }
        }

        self.index.set_head(remote_head);
        self.persist()?;
        Ok(PullOutcome {
            head: remote_head.to_string(),
            fetched_paths,
            conflicts,
        })
    }

    /// One path the remote still carries.
    fn reconcile_present(
        &mut self,
        path: &str,
        content: &str,
        fetched_paths: &mut Vec<String>,
        conflicts: &mut Vec<ConflictInfo>,
    ) -> VfsResult<()> {
        let remote_sha = ContentSha::of(content);
        let Some(entry) = self.index.get(path).cloned() else {
            // New on the remote: becomes base.
            self.backend.write_blob(path, content, Segment::Base)?;
            self.index.insert(IndexEntry::base(path, remote_sha));
            fetched_paths.push(path.to_string());
            return Ok(());
        };

        match entry.state {
            EntryState::Base => {
                if entry.base_sha != Some(remote_sha) {
                    self.backend.write_blob(path, content, Segment::Base)?;
                    self.update_entry(path, |e| e.base_sha = Some(remote_sha));
                    fetched_paths.push(path.to_string());
                }
            }
            EntryState::Added | EntryState::Modified => {
                if entry.base_sha == Some(remote_sha) {
                    // Remote unchanged since base: the local edit stands.
                } else if entry.workspace_sha == Some(remote_sha) {
                    self.promote_workspace_to_base(path, content, remote_sha)?;
                    fetched_paths.push(path.to_string());
                } else if self.persist_remote_conflict(path, Some(content), remote_sha)? {
                    conflicts.push(ConflictInfo {
                        path: path.to_string(),
                        remote_sha: Some(remote_sha),
                    });
                    fetched_paths.push(path.to_string());
                }
            }
            EntryState::Deleted => {
                if entry.base_sha == Some(remote_sha) {
                    // Remote unchanged: the tombstone stands until pushed.
                } else if self.persist_remote_conflict(path, Some(content), remote_sha)? {
                    // Local delete vs remote change.
                    conflicts.push(ConflictInfo {
                        path: path.to_string(),
                        remote_sha: Some(remote_sha),
                    });
                    fetched_paths.push(path.to_string());
                }
            }
            EntryState::Conflict => {
                if entry.base_sha == Some(remote_sha) {
                    // Remote reverted to the base bytes: the conflict
                    // dissolves back into a plain local edit.
                    self.backend.delete_blob(path, Some(Segment::Conflict))?;
                    self.update_entry(path, |e| {
                        e.remote_sha = None;
                        e.state = if e.workspace_sha.is_some() {
                            EntryState::Modified
                        } else {
                            EntryState::Deleted
                        };
                    });
                } else if entry.workspace_sha == Some(remote_sha) {
                    self.promote_workspace_to_base(path, content, remote_sha)?;
                    fetched_paths.push(path.to_string());
                } else if self.persist_remote_conflict(path, Some(content), remote_sha)? {
                    conflicts.push(ConflictInfo {
                        path: path.to_string(),
                        remote_sha: Some(remote_sha),
                    });
                    fetched_paths.push(path.to_string());
                }
            }
        }
        Ok(())
    }

    /// One path the remote no longer carries.
    fn reconcile_absent(
        &mut self,
        path: &str,
        conflicts: &mut Vec<ConflictInfo>,
    ) -> VfsResult<()> {
        let Some(entry) = self.index.get(path).cloned() else {
            return Ok(());
        };

        match entry.state {
            EntryState::Base => {
                self.backend.delete_blob(path, Some(Segment::Base))?;
                self.index.remove(path)?;
            }
            EntryState::Deleted => {
                // Both sides deleted: the tombstone is finalized.
                self.backend.delete_blob(path, None)?;
                self.index.remove(path)?;
            }
            EntryState::Added => {} // local-only file is untouched
            EntryState::Modified => {
                // Local change vs remote delete.
                self.update_entry(path, |e| {
                    e.state = EntryState::Conflict;
                    e.remote_sha = None;
                });
                conflicts.push(ConflictInfo {
                    path: path.to_string(),
                    remote_sha: None,
                });
            }
            EntryState::Conflict => {
                if entry.workspace_sha.is_some() {
                    // The conflicting remote content has since been deleted;
                    // this is now a change-vs-delete conflict.
                    self.backend.delete_blob(path, Some(Segment::Conflict))?;
                    self.update_entry(path, |e| e.remote_sha = None);
                    conflicts.push(ConflictInfo {
                        path: path.to_string(),
                        remote_sha: None,
                    });
                } else {
                    // Local delete vs a remote change that was itself
                    // deleted: both sides agree the path is gone.
                    self.backend.delete_blob(path, None)?;
                    self.index.remove(path)?;
                }
            }
        }
        Ok(())
    }

    /// Both sides hold the same bytes: the workspace copy becomes base.
    fn promote_workspace_to_base(
        &mut self,
        path: &str,
        content: &str,
        sha: ContentSha,
    ) -> VfsResult<()> {
        self.backend.write_blob(path, content, Segment::Base)?;
        self.backend.delete_blob(path, Some(Segment::Workspace))?;
        self.backend.delete_blob(path, Some(Segment::Conflict))?;
        self.update_entry(path, |e| {
            e.state = EntryState::Base;
            e.base_sha = Some(sha);
            e.workspace_sha = None;
            e.remote_sha = None;
        });
        Ok(())
    }

    /// Persist the remote side of a conflict. A backend failure here is
    /// logged and skipped rather than aborting the whole pull; the next
    /// pull retries the path. Returns whether the conflict was recorded.
    fn persist_remote_conflict(
        &mut self,
        path: &str,
        content: Option<&str>,
        remote_sha: ContentSha,
    ) -> VfsResult<bool> {
        if let Some(content) = content {
            if let Err(e) = self.backend.write_blob(path, content, Segment::Conflict) {
                tracing::warn!(path, error = %e, "failed to persist remote conflict content, skipping path");
                return Ok(false);
            }
        }
        self.update_entry(path, |e| {
            e.state = EntryState::Conflict;
            e.remote_sha = Some(remote_sha);
        });
        Ok(true)
    }

    // ---------------------------------------------------------------
    // Push
    // ---------------------------------------------------------------

    /// Apply the accumulated change set as one remote commit.
    ///
    /// Fails without touching the remote when the parent is stale or any
    /// path is still conflicted. An empty change set is a no-op that makes
    /// no remote calls at all.
    pub async fn push(&mut self, request: PushRequest) -> VfsResult<PushOutcome> {
        if request.parent_sha != self.index.head() {
            return Err(VfsError::HeadMismatch {
                given: request.parent_sha,
                local: self.index.head().to_string(),
            });
        }
        if self.index.has_conflicts() {
            return Err(VfsError::UnresolvedConflicts(self.index.conflict_paths()));
        }

        let changes = match request.changes {
            Some(changes) => changes,
            None => self.materialized_change_set()?,
        };
        if changes.is_empty() {
            return Ok(PushOutcome {
                commit_sha: request.parent_sha,
                noop: true,
            });
        }

        let remote = self.remote()?;
        let branch = self.branch.clone();
        let message = request.message.clone();
        let commit_sha = with_retry(&self.retry, || {
            let remote = Arc::clone(&remote);
            let branch = branch.clone();
            let message = message.clone();
            let changes = changes.clone();
            async move {
                remote
                    .create_commit_with_actions(&branch, &message, &changes)
                    .await
            }
        })
        .await?;

        self.promote_after_commit()?;
        self.index.set_head(&commit_sha);
        self.index.set_last_commit_key(&commit_sha);

        // The commit API may have moved the ref already; a failure here is
        // not fatal to the push.
        if let Err(e) = remote.update_ref(&branch, &commit_sha).await {
            tracing::debug!(branch = %branch, error = %e, "ref update after commit failed");
        }

        self.persist()?;
        tracing::debug!(commit = %commit_sha, "push complete");
        Ok(PushOutcome {
            commit_sha,
            noop: false,
        })
    }

    /// The change set with create/update content filled from storage.
    fn materialized_change_set(&self) -> VfsResult<Vec<Change>> {
        let mut changes = self.index.change_set();
        for change in &mut changes {
            if matches!(change.kind, ChangeKind::Create | ChangeKind::Update) {
                let content = self
                    .backend
                    .read_blob(&change.path, None)?
                    .ok_or_else(|| VfsError::MissingContent(change.path.clone()))?;
                change.content = Some(content);
            }
        }
        Ok(changes)
    }

    /// After a successful commit: dirty entries become base, tombstones are
    /// reaped.
    fn promote_after_commit(&mut self) -> VfsResult<()> {
        for path in self.index.tracked_paths() {
            let Some(entry) = self.index.get(&path).cloned() else {
                continue;
            };
            match entry.state {
                EntryState::Added | EntryState::Modified => {
                    if let Some(content) =
                        self.backend.read_blob(&path, Some(Segment::Workspace))?
                    {
                        self.backend.write_blob(&path, &content, Segment::Base)?;
                    }
                    self.backend.delete_blob(&path, Some(Segment::Workspace))?;
                    self.update_entry(&path, |e| {
                        e.base_sha = e.workspace_sha.take();
                        e.state = EntryState::Base;
                    });
                }
                EntryState::Deleted => {
                    self.backend.delete_blob(&path, Some(Segment::Base))?;
                    self.index.remove(&path)?;
                }
                EntryState::Base | EntryState::Conflict => {}
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Conflict resolution
    // ---------------------------------------------------------------

    /// Settle a conflicted path. Either way the remote side becomes the new
    /// merge base; the resolution decides whether the local side survives
    /// on top of it.
    pub fn resolve_conflict(
        &mut self,
        path: &str,
        resolution: ConflictResolution,
    ) -> VfsResult<()> {
        let entry = self.index.get(path).cloned();
        let Some(entry) = entry.filter(|e| e.state == EntryState::Conflict) else {
            return Err(VfsError::NotInConflict(path.to_string()));
        };

        // Promote the remote side into base.
        let remote_content = self.backend.read_blob(path, Some(Segment::Conflict))?;
        let new_base_sha = match (&remote_content, entry.remote_sha) {
            (Some(content), Some(sha)) => {
                self.backend.write_blob(path, content, Segment::Base)?;
                Some(sha)
            }
            _ => {
                // The conflict was a remote deletion.
                self.backend.delete_blob(path, Some(Segment::Base))?;
                None
            }
        };
        self.backend.delete_blob(path, Some(Segment::Conflict))?;

        match resolution {
            ConflictResolution::KeepWorkspace => match entry.workspace_sha {
                Some(workspace_sha) => {
                    if new_base_sha == Some(workspace_sha) {
                        // Local bytes equal the remote side after all.
                        self.backend.delete_blob(path, Some(Segment::Workspace))?;
                        self.update_entry(path, |e| {
                            e.state = EntryState::Base;
                            e.base_sha = new_base_sha;
                            e.workspace_sha = None;
                            e.remote_sha = None;
                        });
                    } else {
                        self.update_entry(path, |e| {
                            e.state = if new_base_sha.is_some() {
                                EntryState::Modified
                            } else {
                                EntryState::Added
                            };
                            e.base_sha = new_base_sha;
                            e.remote_sha = None;
                        });
                    }
                }
                None => {
                    // The local side was a deletion.
                    if new_base_sha.is_some() {
                        self.update_entry(path, |e| {
                            e.state = EntryState::Deleted;
                            e.base_sha = new_base_sha;
                            e.remote_sha = None;
                        });
                    } else {
                        // Remote deleted it too: nothing left to track.
                        self.backend.delete_blob(path, None)?;
                        self.index.remove(path)?;
                    }
                }
            },
            ConflictResolution::TakeRemote => {
                self.backend.delete_blob(path, Some(Segment::Workspace))?;
                if new_base_sha.is_some() {
                    self.update_entry(path, |e| {
                        e.state = EntryState::Base;
                        e.base_sha = new_base_sha;
                        e.workspace_sha = None;
                        e.remote_sha = None;
                    });
                } else {
                    self.index.remove(path)?;
                }
            }
        }
        self.persist()
    }
}

impl std::fmt::Debug for Vfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vfs")
            .field("branch", &self.branch)
            .field("head", &self.index.head())
            .field("entries", &self.index.len())
            .field("has_remote", &self.remote.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silt_store::MemoryBackend;

    fn make_vfs() -> (Arc<MemoryBackend>, Vfs) {
        let backend = Arc::new(MemoryBackend::new());
        let mut vfs = Vfs::new(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        vfs.init().unwrap();
        (backend, vfs)
    }

    fn snapshot(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    fn state_of(vfs: &Vfs, path: &str) -> EntryState {
        vfs.index().get(path).expect("entry should exist").state
    }

    // -----------------------------------------------------------------------
    // write_file
    // -----------------------------------------------------------------------

    #[test]
    fn write_new_path_is_added() {
        let (_backend, mut vfs) = make_vfs();
        vfs.write_file("a.txt", "hello").unwrap();

        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Added);
        assert_eq!(vfs.read_workspace("a.txt").unwrap().as_deref(), Some("hello"));
        assert_eq!(vfs.list_paths(), ["a.txt"]);
    }

    #[test]
    fn write_identical_to_base_does_not_dirty() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();

        vfs.write_file("a.txt", "v1").unwrap();
        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Base);
        assert!(vfs.read_workspace("a.txt").unwrap().is_none());
        assert!(vfs.change_set().is_empty());
    }

    #[test]
    fn write_over_base_is_modified() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();

        vfs.write_file("a.txt", "v2").unwrap();
        let entry = vfs.index().get("a.txt").unwrap();
        assert_eq!(entry.state, EntryState::Modified);
        assert_eq!(entry.base_sha, Some(ContentSha::of("v1")));
        assert_eq!(entry.workspace_sha, Some(ContentSha::of("v2")));
    }

    #[test]
    fn rewriting_base_bytes_reverts_modification() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();
        vfs.write_file("a.txt", "v2").unwrap();

        vfs.write_file("a.txt", "v1").unwrap();
        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Base);
        assert!(vfs.read_workspace("a.txt").unwrap().is_none());
        assert!(vfs.change_set().is_empty());
    }

    #[test]
    fn write_over_tombstone_untombstones() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();
        vfs.delete_file("a.txt").unwrap();

        vfs.write_file("a.txt", "v2").unwrap();
        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Modified);
        assert_eq!(vfs.read_file("a.txt").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn write_base_bytes_over_tombstone_restores_base() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();
        vfs.delete_file("a.txt").unwrap();

        vfs.write_file("a.txt", "v1").unwrap();
        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Base);
        assert!(vfs.change_set().is_empty());
    }

    #[test]
    fn write_during_conflict_keeps_conflict_state() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();
        vfs.write_file("a.txt", "local").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a.txt", "remote")])).unwrap();
        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Conflict);

        vfs.write_file("a.txt", "local v2").unwrap();
        let entry = vfs.index().get("a.txt").unwrap();
        assert_eq!(entry.state, EntryState::Conflict);
        assert_eq!(entry.workspace_sha, Some(ContentSha::of("local v2")));
        assert_eq!(entry.remote_sha, Some(ContentSha::of("remote")));
    }

    // -----------------------------------------------------------------------
    // delete_file / rename
    // -----------------------------------------------------------------------

    #[test]
    fn delete_base_leaves_tombstone() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();

        vfs.delete_file("a.txt").unwrap();
        let entry = vfs.index().get("a.txt").unwrap();
        assert_eq!(entry.state, EntryState::Deleted);
        assert_eq!(entry.base_sha, Some(ContentSha::of("v1")));
        assert!(vfs.list_paths().is_empty());

        let changes = vfs.change_set();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Delete);
    }

    #[test]
    fn delete_added_drops_entry() {
        let (_backend, mut vfs) = make_vfs();
        vfs.write_file("a.txt", "local only").unwrap();

        vfs.delete_file("a.txt").unwrap();
        assert!(vfs.index().get("a.txt").is_none());
        assert!(vfs.read_file("a.txt").unwrap().is_none());
        assert!(vfs.change_set().is_empty());
    }

    #[test]
    fn delete_is_idempotent_and_tolerates_untracked() {
        let (_backend, mut vfs) = make_vfs();
        vfs.delete_file("never-existed.txt").unwrap();

        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();
        vfs.delete_file("a.txt").unwrap();
        vfs.delete_file("a.txt").unwrap();
        assert_eq!(state_of(&vfs, "a.txt"), EntryState::Deleted);
    }

    #[test]
    fn rename_is_delete_plus_create() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a.txt", "v1")])).unwrap();

        vfs.rename("a.txt", "b.txt").unwrap();
        let changes = vfs.change_set();
        let kinds: Vec<_> = changes.iter().map(|c| (c.kind, c.path.as_str())).collect();
        assert_eq!(
            kinds,
            [(ChangeKind::Delete, "a.txt"), (ChangeKind::Create, "b.txt")]
        );
        assert_eq!(vfs.read_file("b.txt").unwrap().as_deref(), Some("v1"));
        assert_eq!(vfs.list_paths(), ["b.txt"]);
    }

    #[test]
    fn rename_missing_source_fails() {
        let (_backend, mut vfs) = make_vfs();
        let result = vfs.rename("ghost.txt", "b.txt");
        assert!(matches!(result, Err(VfsError::SourceNotFound(_))));
    }

    // -----------------------------------------------------------------------
    // apply_base_snapshot
    // -----------------------------------------------------------------------

    #[test]
    fn apply_snapshot_installs_base() {
        let (backend, mut vfs) = make_vfs();
        vfs.apply_base_snapshot(&snapshot(&[("a.txt", "v1"), ("b.txt", "v2")]), "h1")
            .unwrap();

        assert_eq!(vfs.head(), "h1");
        assert_eq!(vfs.list_paths(), ["a.txt", "b.txt"]);
        assert_eq!(
            backend.read_blob("a.txt", Some(Segment::Base)).unwrap().as_deref(),
            Some("v1")
        );
        assert!(vfs.read_workspace("a.txt").unwrap().is_none());
    }

    #[test]
    fn apply_snapshot_drops_vanished_paths() {
        let (_backend, mut vfs) = make_vfs();
        vfs.apply_base_snapshot(&snapshot(&[("a.txt", "v1"), ("b.txt", "v2")]), "h1")
            .unwrap();
        vfs.apply_base_snapshot(&snapshot(&[("a.txt", "v1")]), "h2").unwrap();

        assert_eq!(vfs.list_paths(), ["a.txt"]);
        assert!(vfs.read_file("b.txt").unwrap().is_none());
    }

    #[test]
    fn apply_snapshot_keeps_local_modification() {
        let (_backend, mut vfs) = make_vfs();
        vfs.apply_base_snapshot(&snapshot(&[("a.txt", "v1")]), "h1").unwrap();
        vfs.write_file("a.txt", "local").unwrap();

        vfs.apply_base_snapshot(&snapshot(&[("a.txt", "v2")]), "h2").unwrap();
        let entry = vfs.index().get("a.txt").unwrap();
        assert_eq!(entry.state, EntryState::Modified);
        assert_eq!(entry.base_sha, Some(ContentSha::of("v2")));
        assert_eq!(vfs.read_file("a.txt").unwrap().as_deref(), Some("local"));
    }

    #[test]
    fn apply_snapshot_turns_orphaned_modification_into_add() {
        let (_backend, mut vfs) = make_vfs();
        vfs.apply_base_snapshot(&snapshot(&[("a.txt", "v1")]), "h1").unwrap();
        vfs.write_file("a.txt", "local").unwrap();

        vfs.apply_base_snapshot(&BTreeMap::new(), "h2").unwrap();
        let entry = vfs.index().get("a.txt").unwrap();
        assert_eq!(entry.state, EntryState::Added);
        assert!(entry.base_sha.is_none());
        assert_eq!(vfs.read_file("a.txt").unwrap().as_deref(), Some("local"));
    }

    // -----------------------------------------------------------------------
    // pull: fast-forward and merge rows
    // -----------------------------------------------------------------------

    #[test]
    fn pull_fast_forward_with_clean_workspace() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();

        let outcome = vfs.pull_snapshot("h2", &snapshot(&[("a", "v2")])).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.fetched_paths, ["a"]);
        assert_eq!(vfs.head(), "h2");
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn pull_unchanged_base_causes_no_churn() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();

        let outcome = vfs.pull_snapshot("h2", &snapshot(&[("a", "v1")])).unwrap();
        assert!(outcome.fetched_paths.is_empty());
        assert_eq!(vfs.head(), "h2");
    }

    #[test]
    fn pull_conflict_on_divergent_edits() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();

        let outcome = vfs.pull_snapshot("h2", &snapshot(&[("a", "remote")])).unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].path, "a");
        assert_eq!(outcome.conflicts[0].remote_sha, Some(ContentSha::of("remote")));

        assert_eq!(state_of(&vfs, "a"), EntryState::Conflict);
        assert_eq!(vfs.read_conflict("a").unwrap().as_deref(), Some("remote"));
        // The local side is untouched.
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("local"));
        assert!(vfs.has_conflicts());
    }

    #[test]
    fn pull_identical_bytes_promote_without_conflict() {
        let (_backend, mut vfs) = make_vfs();
        vfs.write_file("a", "same").unwrap();

        let outcome = vfs.pull_snapshot("h1", &snapshot(&[("a", "same")])).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(state_of(&vfs, "a"), EntryState::Base);
        assert!(vfs.read_workspace("a").unwrap().is_none());
        assert!(vfs.change_set().is_empty());
    }

    #[test]
    fn pull_added_vs_different_remote_conflicts() {
        let (_backend, mut vfs) = make_vfs();
        vfs.write_file("a", "mine").unwrap();

        let outcome = vfs.pull_snapshot("h1", &snapshot(&[("a", "theirs")])).unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(state_of(&vfs, "a"), EntryState::Conflict);
        // An added path has no base.
        assert!(vfs.index().get("a").unwrap().base_sha.is_none());
    }

    #[test]
    fn pull_keeps_local_modification_when_remote_unchanged() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();

        let outcome = vfs.pull_snapshot("h2", &snapshot(&[("a", "v1")])).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(state_of(&vfs, "a"), EntryState::Modified);
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("local"));
    }

    // -----------------------------------------------------------------------
    // pull: deletion rows
    // -----------------------------------------------------------------------

    #[test]
    fn pull_finalizes_tombstone_when_remote_deleted() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.delete_file("a").unwrap();

        let outcome = vfs.pull_snapshot("h2", &BTreeMap::new()).unwrap();
        assert!(outcome.is_clean());
        assert!(vfs.index().get("a").is_none());
        assert!(vfs.read_file("a").unwrap().is_none());
    }

    #[test]
    fn pull_keeps_tombstone_when_remote_unchanged() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.delete_file("a").unwrap();

        let outcome = vfs.pull_snapshot("h2", &snapshot(&[("a", "v1")])).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(state_of(&vfs, "a"), EntryState::Deleted);
    }

    #[test]
    fn pull_local_delete_vs_remote_change_conflicts() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.delete_file("a").unwrap();

        let outcome = vfs.pull_snapshot("h2", &snapshot(&[("a", "v2")])).unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        let entry = vfs.index().get("a").unwrap();
        assert_eq!(entry.state, EntryState::Conflict);
        assert!(entry.workspace_sha.is_none());
        assert_eq!(vfs.read_conflict("a").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn pull_local_change_vs_remote_delete_conflicts() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();

        let outcome = vfs.pull_snapshot("h2", &BTreeMap::new()).unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].remote_sha, None);
        assert_eq!(state_of(&vfs, "a"), EntryState::Conflict);
        assert!(vfs.read_conflict("a").unwrap().is_none());
    }

    #[test]
    fn pull_drops_clean_base_when_remote_deleted() {
        let (backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();

        let outcome = vfs.pull_snapshot("h2", &BTreeMap::new()).unwrap();
        assert!(outcome.is_clean());
        assert!(vfs.index().get("a").is_none());
        assert!(backend.read_blob("a", Some(Segment::Base)).unwrap().is_none());
    }

    #[test]
    fn pull_keeps_local_only_file_when_remote_absent() {
        let (_backend, mut vfs) = make_vfs();
        vfs.write_file("a", "local only").unwrap();

        let outcome = vfs.pull_snapshot("h1", &BTreeMap::new()).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(state_of(&vfs, "a"), EntryState::Added);
    }

    // -----------------------------------------------------------------------
    // pull: idempotence and conflict evolution
    // -----------------------------------------------------------------------

    #[test]
    fn pull_is_idempotent() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1"), ("b", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();

        let files = snapshot(&[("a", "remote"), ("b", "v2"), ("c", "new")]);
        let first = vfs.pull_snapshot("h2", &files).unwrap();
        let entries_after_first = vfs.index().entries().clone();

        let second = vfs.pull_snapshot("h2", &files).unwrap();
        assert_eq!(second.conflicts, first.conflicts);
        // Shas and states converge; only timestamps may differ.
        for (path, entry) in vfs.index().entries() {
            let before = &entries_after_first[path];
            assert_eq!(entry.state, before.state, "state changed for {path}");
            assert_eq!(entry.base_sha, before.base_sha);
            assert_eq!(entry.workspace_sha, before.workspace_sha);
            assert_eq!(entry.remote_sha, before.remote_sha);
        }
        assert_eq!(vfs.head(), "h2");
    }

    #[test]
    fn conflict_dissolves_when_remote_reverts_to_base() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a", "remote")])).unwrap();
        assert!(vfs.has_conflicts());

        vfs.pull_snapshot("h3", &snapshot(&[("a", "v1")])).unwrap();
        let entry = vfs.index().get("a").unwrap();
        assert_eq!(entry.state, EntryState::Modified);
        assert!(entry.remote_sha.is_none());
        assert!(vfs.read_conflict("a").unwrap().is_none());
    }

    #[test]
    fn conflict_promotes_when_remote_catches_up_to_workspace() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a", "remote")])).unwrap();

        let outcome = vfs.pull_snapshot("h3", &snapshot(&[("a", "local")])).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(state_of(&vfs, "a"), EntryState::Base);
        assert!(vfs.change_set().is_empty());
    }

    // -----------------------------------------------------------------------
    // push gating (no remote traffic involved)
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn push_with_stale_parent_mutates_nothing() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "v2").unwrap();
        let changes_before = vfs.change_set();

        let result = vfs.push(PushRequest::new("msg", "stale")).await;
        assert!(matches!(result, Err(VfsError::HeadMismatch { .. })));
        assert_eq!(vfs.head(), "h1");
        assert_eq!(vfs.change_set(), changes_before);
    }

    #[tokio::test]
    async fn push_with_conflicts_is_rejected() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a", "remote")])).unwrap();

        let result = vfs.push(PushRequest::new("msg", "h2")).await;
        match result {
            Err(VfsError::UnresolvedConflicts(paths)) => assert_eq!(paths, ["a"]),
            other => panic!("expected UnresolvedConflicts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_push_is_noop_without_remote_calls() {
        // No remote is configured at all, so reaching the adapter would fail:
        // the no-op short-circuit must come first.
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();

        let outcome = vfs.push(PushRequest::new("msg", "h1")).await.unwrap();
        assert!(outcome.noop);
        assert_eq!(outcome.commit_sha, "h1");
    }

    // -----------------------------------------------------------------------
    // resolve_conflict
    // -----------------------------------------------------------------------

    fn conflicted_vfs() -> (Arc<MemoryBackend>, Vfs) {
        let (backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a", "remote")])).unwrap();
        (backend, vfs)
    }

    #[test]
    fn resolve_keep_workspace_rebases_local_edit() {
        let (backend, mut vfs) = conflicted_vfs();
        vfs.resolve_conflict("a", ConflictResolution::KeepWorkspace).unwrap();

        let entry = vfs.index().get("a").unwrap();
        assert_eq!(entry.state, EntryState::Modified);
        assert_eq!(entry.base_sha, Some(ContentSha::of("remote")));
        assert!(entry.remote_sha.is_none());
        assert_eq!(
            backend.read_blob("a", Some(Segment::Base)).unwrap().as_deref(),
            Some("remote")
        );
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("local"));
        assert!(vfs.read_conflict("a").unwrap().is_none());
        assert!(!vfs.has_conflicts());
    }

    #[test]
    fn resolve_take_remote_discards_local_edit() {
        let (_backend, mut vfs) = conflicted_vfs();
        vfs.resolve_conflict("a", ConflictResolution::TakeRemote).unwrap();

        assert_eq!(state_of(&vfs, "a"), EntryState::Base);
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("remote"));
        assert!(vfs.change_set().is_empty());
    }

    #[test]
    fn resolve_remote_delete_keeping_workspace_turns_into_add() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();
        vfs.pull_snapshot("h2", &BTreeMap::new()).unwrap();

        vfs.resolve_conflict("a", ConflictResolution::KeepWorkspace).unwrap();
        let entry = vfs.index().get("a").unwrap();
        assert_eq!(entry.state, EntryState::Added);
        assert!(entry.base_sha.is_none());
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("local"));
    }

    #[test]
    fn resolve_remote_delete_taking_remote_drops_path() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.write_file("a", "local").unwrap();
        vfs.pull_snapshot("h2", &BTreeMap::new()).unwrap();

        vfs.resolve_conflict("a", ConflictResolution::TakeRemote).unwrap();
        assert!(vfs.index().get("a").is_none());
        assert!(vfs.read_file("a").unwrap().is_none());
    }

    #[test]
    fn resolve_delete_vs_change_keeping_deletion() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.delete_file("a").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a", "v2")])).unwrap();

        vfs.resolve_conflict("a", ConflictResolution::KeepWorkspace).unwrap();
        let entry = vfs.index().get("a").unwrap();
        assert_eq!(entry.state, EntryState::Deleted);
        assert_eq!(entry.base_sha, Some(ContentSha::of("v2")));

        let changes = vfs.change_set();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Delete);
    }

    #[test]
    fn resolve_delete_vs_change_taking_remote() {
        let (_backend, mut vfs) = make_vfs();
        vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
        vfs.delete_file("a").unwrap();
        vfs.pull_snapshot("h2", &snapshot(&[("a", "v2")])).unwrap();

        vfs.resolve_conflict("a", ConflictResolution::TakeRemote).unwrap();
        assert_eq!(state_of(&vfs, "a"), EntryState::Base);
        assert_eq!(vfs.read_file("a").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn resolve_non_conflicted_path_errors() {
        let (_backend, mut vfs) = make_vfs();
        vfs.write_file("a", "x").unwrap();
        let result = vfs.resolve_conflict("a", ConflictResolution::TakeRemote);
        assert!(matches!(result, Err(VfsError::NotInConflict(_))));
    }

    // -----------------------------------------------------------------------
    // Persistence across instances
    // -----------------------------------------------------------------------

    #[test]
    fn state_survives_reload() {
        let backend = Arc::new(MemoryBackend::new());
        {
            let mut vfs = Vfs::new(Arc::clone(&backend) as Arc<dyn StorageBackend>);
            vfs.init().unwrap();
            vfs.pull_snapshot("h1", &snapshot(&[("a", "v1")])).unwrap();
            vfs.write_file("b", "local").unwrap();
        }

        let mut reloaded = Vfs::new(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        reloaded.init().unwrap();
        assert_eq!(reloaded.head(), "h1");
        assert_eq!(reloaded.list_paths(), ["a", "b"]);
        assert_eq!(state_of(&reloaded, "b"), EntryState::Added);
    }
}
