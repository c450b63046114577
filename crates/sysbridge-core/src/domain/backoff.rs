//! Exponential backoff for reconnecting to, or relaunching, the backend.
//!
//! Delay for attempt `n` (0-indexed) is `initial_delay * 2^n`, capped at
//! `max_delay`.  An optional attempt budget turns the policy off once spent.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<u32>,
}

impl ExponentialBackoff {
    /// `max_attempts = None` retries forever.
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            initial_delay,
            max_delay: max_delay.max(initial_delay),
            max_attempts,
        }
    }

    /// Returns how long to wait before attempt `attempt`, or `None` once the
    /// budget is exhausted.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.should_retry(attempt) {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self
            .initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }
}

impl Default for ExponentialBackoff {
    /// 1 s doubling up to 60 s, unlimited attempts.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60), None)
    }
}
