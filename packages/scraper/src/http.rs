//! HTTP retry helper for transient errors.
//!
//! Fetchers in this crate call [`send_text`] instead of
//! `reqwest::RequestBuilder::send()` directly, so every request gets
//! retried with exponential backoff on connection failures, timeouts,
//! HTTP 429 and HTTP 5xx.
//!
//! ```ignore
//! let html = http::send_text(|| client.get(&url).timeout(timeout)).await?;
//! ```

use std::time::Duration;

use crate::ScrapeError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving up
/// is 14 seconds.
pub const MAX_RETRIES: u32 = 3;

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// Does **not** retry HTTP 4xx (except 429); these are permanent.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F) -> Result<String, ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    Ok(response.text().await?)
}

/// Core retry loop.
///
/// Returns the successful [`reqwest::Response`] (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }
        let can_retry = attempt < max_retries;
        attempt += 1;

        let response = match build_request().send().await {
            Ok(response) => response,
            Err(e) if is_transient(&e) && can_retry => {
                log::warn!("  transient error: {e}");
                continue;
            }
            Err(e) => return Err(ScrapeError::Http(e)),
        };

        let status = response.status();
        let retryable =
            status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

        if retryable && can_retry {
            log::warn!("  HTTP {status} from {}", response.url());
            continue;
        }
        if retryable || status.is_client_error() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        return Ok(response);
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
