//! Remote hosting adapters for the silt virtual filesystem.
//!
//! A [`RemoteAdapter`] abstracts a hosting provider behind two essential
//! operations: fetching a branch snapshot (head commit plus file contents)
//! and applying a change set as a single commit. Two providers are shipped:
//!
//! - [`GitHubRemote`] -- composes the blob/tree/commit/ref endpoints into
//!   one actions-style commit
//! - [`GitLabRemote`] -- uses the commits API, which applies a list of
//!   actions natively
//!
//! Network calls are classified as retryable or terminal and wrapped in
//! [`with_retry`], an exponential-backoff helper that keeps HTTP specifics
//! out of the policy.

pub mod error;
pub mod github;
pub mod gitlab;
mod http;
pub mod retry;
pub mod traits;

pub use error::{RemoteError, RemoteResult};
pub use github::{GitHubOptions, GitHubRemote};
pub use gitlab::{GitLabOptions, GitLabRemote};
pub use retry::{with_retry, RetryPolicy};
pub use traits::{RemoteAdapter, RemoteSnapshot};
