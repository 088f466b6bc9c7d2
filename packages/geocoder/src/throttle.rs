//! Minimum spacing between provider requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between the starts of consecutive requests.
///
/// Callers are serialized on an async mutex while they wait, so even
/// concurrent callers never exceed one request per interval.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle allowing one request per `interval`. A zero
    /// interval disables throttling.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// The configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request may start, then records it as started.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            if Instant::now() < ready_at {
                log::trace!("Throttling provider request until {ready_at:?}");
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_consecutive_requests() {
        let throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        throttle.wait().await;
        assert!(Instant::now() - start >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_interval_has_passed() {
        let throttle = Throttle::new(Duration::from_secs(1));
        throttle.wait().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        throttle.wait().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_waits() {
        let throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            throttle.wait().await;
        }
        assert_eq!(Instant::now(), start);
    }
}
