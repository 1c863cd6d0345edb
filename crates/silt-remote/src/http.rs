//! Shared response plumbing for the provider adapters.

use std::time::Duration;

use crate::error::{RemoteError, RemoteResult};

pub(crate) const USER_AGENT: &str = concat!("silt/", env!("CARGO_PKG_VERSION"));

/// Map a non-2xx response to [`RemoteError::Http`], carrying the body text
/// verbatim and any `Retry-After` delay the server requested.
pub(crate) async fn expect_success(resp: reqwest::Response) -> RemoteResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::Http {
        status: status.as_u16(),
        body,
        retry_after,
    })
}

/// Decode a response body as JSON, or fail terminally.
pub(crate) async fn json_body(resp: reqwest::Response) -> RemoteResult<serde_json::Value> {
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| RemoteError::InvalidJson(e.to_string()))
}

/// Extract a required string field by JSON pointer, or fail terminally.
pub(crate) fn require_str<'v>(
    value: &'v serde_json::Value,
    pointer: &str,
) -> RemoteResult<&'v str> {
    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RemoteError::UnexpectedResponse(format!("missing `{pointer}`")))
}
