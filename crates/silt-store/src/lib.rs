//! Segmented storage for the silt virtual filesystem.
//!
//! A storage root is partitioned into four logical segments:
//!
//! - `workspace` -- the user-visible mutable layer; absence of a key means
//!   "unmodified relative to base"
//! - `base` -- the immutable snapshot last reconciled with the remote
//! - `conflict` -- remote bytes persisted side-by-side when a pull cannot
//!   auto-merge
//! - `info` -- per-path metadata records (the enumeration form of the index)
//!
//! # Key Types
//!
//! - [`StorageBackend`] -- the backend contract
//! - [`MemoryBackend`] -- `BTreeMap`-based backend for tests and embedding
//! - [`FsBackend`] -- one directory per segment on a local filesystem
//! - [`IndexEntry`] / [`IndexFile`] -- the persisted metadata records
//!
//! # Design Rules
//!
//! 1. Operations are serialized per backend instance; there is no cross-path
//!    atomicity. Callers write data segments first and the index last so a
//!    crash is recoverable to the last durable index.
//! 2. Backends never interpret blob contents or apply state transitions --
//!    entry semantics live entirely in the VFS core.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod record;
pub mod segment;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBackend;
pub use memory::MemoryBackend;
pub use record::{EntryState, IndexEntry, IndexFile};
pub use segment::Segment;
pub use traits::{FileListing, StorageBackend};
