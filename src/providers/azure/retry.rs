use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Bounded retry with linearly growing waits (`step * attempt`).
///
/// 404 is never retried; the transport answers it before consulting the policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
    pub retry_on: fn(StatusCode) -> bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
            retry_on: retry_any_failure,
        }
    }

    /// Wait before the retry that follows `attempt` (1-based). Saturates
    /// instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }

    pub fn should_retry(&self, status: StatusCode) -> bool {
        (self.retry_on)(status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF_STEP)
    }
}

fn retry_any_failure(status: StatusCode) -> bool {
    status != StatusCode::NOT_FOUND
}
