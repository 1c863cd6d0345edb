//! A client-side virtual filesystem with Git-like sync.
//!
//! Applications read and write files locally; the VFS tracks divergence
//! from a known remote base, detects three-way conflicts on pull, and
//! pushes accumulated edits as a single commit.
//!
//! # Key Types
//!
//! - [`Vfs`] -- the state machine: write/delete/rename locally, pull and
//!   push against a remote branch
//! - [`PullOutcome`] / [`PushOutcome`] -- operation results
//! - [`ConflictResolution`] -- how to settle a conflicted path
//!
//! Storage and the remote are pluggable: any [`StorageBackend`] and any
//! [`RemoteAdapter`] work. The backend is exclusive to one `Vfs` instance;
//! consistency with other clients of the shared remote is maintained solely
//! by parent-sha gating at push time.
//!
//! ```no_run
//! use std::sync::Arc;
//! use silt_vfs::{MemoryBackend, PushRequest, Vfs};
//!
//! # fn main() -> Result<(), silt_vfs::VfsError> {
//! let mut vfs = Vfs::new(Arc::new(MemoryBackend::new()));
//! vfs.init()?;
//! vfs.write_file("notes/today.md", "ship it")?;
//! assert_eq!(vfs.list_paths(), ["notes/today.md"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod vfs;

pub use error::{VfsError, VfsResult};
pub use types::{ConflictInfo, ConflictResolution, PullOutcome, PushOutcome, PushRequest};
pub use vfs::Vfs;

// Re-export the seams so embedders need only this crate.
pub use silt_index::{EntryState, Index, IndexEntry};
pub use silt_remote::{
    GitHubOptions, GitHubRemote, GitLabOptions, GitLabRemote, RemoteAdapter, RemoteError,
    RemoteSnapshot, RetryPolicy,
};
pub use silt_store::{FsBackend, MemoryBackend, Segment, StorageBackend};
pub use silt_types::{Change, ChangeKind, ContentSha};
