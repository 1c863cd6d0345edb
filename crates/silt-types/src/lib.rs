//! Shared types for the silt virtual filesystem.
//!
//! # Key Types
//!
//! - [`ContentSha`] -- SHA-1 fingerprint of a file's content, lowercase hex
//! - [`Change`] / [`ChangeKind`] -- one create/update/delete action in a
//!   commit's change set
//! - [`TypeError`] -- parse failures for the above

pub mod change;
pub mod error;
pub mod sha;

pub use change::{sort_for_commit, Change, ChangeKind};
pub use error::TypeError;
pub use sha::ContentSha;
