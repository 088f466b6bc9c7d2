//! Retry helper for transient geocoding failures.
//!
//! Only errors for which [`GeocodeError::is_transient`] is `true` are
//! retried (timeouts, connection failures, HTTP 429, HTTP 5xx). Everything
//! else is returned immediately.
//!
//! With `max_retries = 0` the operation runs exactly once, which is the
//! default for interactive lookups: the caller reports "unavailable" and
//! may try again later.

use std::future::Future;
use std::time::Duration;

use crate::GeocodeError;

/// Largest backoff exponent; keeps the delay computation from overflowing.
const MAX_BACKOFF_SHIFT: u32 = 10;

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`.
#[must_use]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
    base.saturating_mul(1u32 << shift)
}

/// Runs `op`, retrying transient failures up to `max_retries` times with
/// exponential backoff starting at `base_delay`.
///
/// `op` is called once per attempt so that a fresh request (with a fresh
/// client identity) is built each time.
///
/// # Errors
///
/// Returns the last [`GeocodeError`] if every attempt failed, or the first
/// non-transient error.
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, GeocodeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    let mut attempt = 0;

    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = backoff_delay(base_delay, attempt);
                log::warn!("  transient error: {e}");
                log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}
