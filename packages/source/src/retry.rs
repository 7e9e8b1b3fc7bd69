//! HTTP retry helpers for transient errors.
//!
//! Dataset fetches go through [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so every request shares the
//! same status handling and, when a dataset opts in, exponential backoff
//! for transient failures (timeouts, connection resets, server errors,
//! rate limiting).
//!
//! # Usage
//!
//! ```ignore
//! use crate::retry::{self, RetryPolicy};
//!
//! let body = retry::send_json(|| client.get(&url), &RetryPolicy::default()).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero sends exactly one request.
    pub max_retries: u32,
    /// Delay unit for the exponential backoff (`base_delay * 2^attempt`).
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A policy with `max_retries` retries and a one-second backoff unit.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Backoff before retry number `attempt` (1-based): 2, 4, 8, ... units.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    /// A single attempt with no retries.
    fn default() -> Self {
        Self::new(0)
    }
}

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (since builders are consumed by
/// `.send()`).
///
/// Connection errors, timeouts, HTTP 429 and HTTP 5xx are retried up to
/// `policy.max_retries` times. Other HTTP 4xx statuses are permanent. A
/// body that is not JSON is reported immediately; re-fetching the same
/// URL would return the same bytes.
///
/// # Errors
///
/// * [`SourceError::Http`] if the request cannot be sent or the body read.
/// * [`SourceError::Status`] for a non-success HTTP status.
/// * [`SourceError::MalformedPayload`] if the body is not JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    policy: &RetryPolicy,
) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, policy).await?;

    // Capture response metadata before consuming the body.
    let url = response.url().to_string();
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|json_err| {
        let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        let ellipsis = if preview.len() < text.len() { "..." } else { "" };
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {preview}{ellipsis}",
            text.len(),
        );
        SourceError::MalformedPayload(json_err)
    })
}

/// Core retry loop behind [`send_json`].
///
/// Sends the request built by `build_request`, retrying on transient
/// errors up to `policy.max_retries` times with exponential backoff.
/// Returns the successful [`reqwest::Response`] (status 2xx). Redirects
/// reqwest does not follow (304, 30x without `Location`) are errors.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_retries = policy.max_retries;
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let error = SourceError::Status {
                    status: status.as_u16(),
                    url: response.url().to_string(),
                };

                // 429 and 5xx are worth another try; other 4xx are permanent.
                if is_retryable_status(status.as_u16()) && attempt < max_retries {
                    log::warn!("  HTTP {status}");
                    attempt += 1;
                    continue;
                }

                if attempt > 0 {
                    log::error!("HTTP {status} after {attempt} retries, giving up");
                }
                return Err(error);
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
#[must_use]
pub fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

/// Returns `true` for HTTP 429 and 5xx.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    status == 429 || matches!(status, 500..=599)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_sends_once() {
        assert_eq!(RetryPolicy::default().max_retries, 0);
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
    }
}
