//! Minimum spacing between provider requests

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive dispatches.
///
/// Call [`RateLimiter::wait`] before every dispatch except the first and
/// [`RateLimiter::mark_dispatch`] right before sending. `wait` only sleeps for
/// whatever part of the interval has not already elapsed.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_dispatch: Option<Instant>,
}

impl RateLimiter {
    /// Limiter allowing `requests_per_minute` requests per minute
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self {
            interval: Duration::from_secs(60) / requests_per_minute.max(1),
            last_dispatch: None,
        }
    }

    /// Minimum spacing between dispatches
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record that a request is being sent now
    pub fn mark_dispatch(&mut self) {
        self.last_dispatch = Some(Instant::now());
    }

    /// Time left before the next dispatch is allowed
    pub fn remaining(&self) -> Duration {
        match self.last_dispatch {
            Some(last) => self.interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the next dispatch is allowed
    pub async fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }
}
