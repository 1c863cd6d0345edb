//! Index management for the silt virtual filesystem.
//!
//! The index is the VFS's authoritative state: one record per tracked path
//! plus the remote head the base segment reflects. This crate owns the
//! in-memory projection and its load/save path; the state transitions that
//! mutate it live in the VFS core.
//!
//! # Key Types
//!
//! - [`Index`] -- the in-memory manager (BTreeMap-backed)
//! - [`IndexEntry`] / [`IndexFile`] / [`EntryState`] -- the persisted
//!   records, re-exported from `silt-store`

pub mod error;
pub mod index;

pub use error::{IndexError, IndexResult};
pub use index::Index;
pub use silt_store::{EntryState, IndexEntry, IndexFile};
