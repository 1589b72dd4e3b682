//! Shared HTTP plumbing for the vendor bindings.
//!
//! Adapters share one pooled [`reqwest::Client`] and apply per-request
//! timeouts. Helpers here convert transport-level failures into the
//! short, stable strings that end up in failed generation results and
//! task error messages — response bodies are truncated so raw vendor
//! payloads never leak into user-visible errors.

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Timeout for chat/text generation calls.
pub const TEXT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for synchronous image generation calls.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for video job submission.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for status probes and credential validation.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest body excerpt included in an error message.
const BODY_SNIPPET_LEN: usize = 200;

/// Render a transport error as a short human-readable message.
pub(crate) fn transport_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        format!("request failed: {err}")
    }
}

/// Parse a response into `T`, mapping non-2xx statuses and undecodable
/// bodies to error strings.
pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("API returned {status}: {}", snippet(&body)));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| format!("malformed API response: {e}"))
}

/// Whether the response carries a success status, discarding the body.
pub(crate) fn is_success(response: &reqwest::Response) -> bool {
    response.status().is_success()
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_SNIPPET_LEN {
        trimmed.to_string()
    } else {
        let mut end = BODY_SNIPPET_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        let s = snippet(&long);
        assert!(s.len() <= BODY_SNIPPET_LEN + 3);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn snippet_keeps_short_bodies() {
        assert_eq!(snippet("  not found  "), "not found");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let s = "é".repeat(300);
        // Must not panic on a multi-byte boundary.
        let _ = snippet(&s);
    }
}
