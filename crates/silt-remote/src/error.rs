use std::time::Duration;

use thiserror::Error;

/// Errors from remote adapter operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-layer failure (connect, DNS, TLS, timeout). Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response. The body text is carried verbatim as the
    /// message. Retryable for 5xx, 408 and 429; terminal otherwise.
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
        /// Parsed `Retry-After` header, when the server sent one.
        retry_after: Option<Duration>,
    },

    /// The response parsed but is missing what the contract requires
    /// (e.g. a commit id). Terminal.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The response body was not valid JSON. Terminal.
    #[error("invalid JSON response: {0}")]
    InvalidJson(String),
}

impl RemoteError {
    /// Whether a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Http { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            RemoteError::UnexpectedResponse(_) | RemoteError::InvalidJson(_) => false,
        }
    }

    /// The server-requested retry delay, when one was sent.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RemoteError::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Transport(e.to_string())
    }
}

/// Result alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;
