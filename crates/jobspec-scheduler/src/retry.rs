//! Exponential back-off for job retries.

use jobspec_core::RetryPolicy;
use std::time::Duration;

pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(3600);

/// Delays between retries of a failed build.
///
/// Retry `n` (1-based) waits `base * 2^(n-1)`, capped at `max_delay`. Retries
/// past `max_retries` are not scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub max_retries: u32,
    pub base: Duration,
    pub max_delay: Duration,
}

impl Backoff {
    pub fn from_policy(policy: &RetryPolicy) -> Self {
        Self {
            max_retries: policy.max_retries,
            base: policy.base_delay(),
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry `attempt`, or `None` once retries are exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        let delay = self.base.checked_mul(factor).unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    /// All retry delays, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_retries)
            .map_while(|attempt| self.delay_for_attempt(attempt))
            .collect()
    }
}
