//! Retry policies for embedding calls

use std::sync::Arc;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::Error;

/// Decides whether a failed call is retried, and after how long
pub trait RetryPolicy: Send + Sync {
    /// Delay before retry number `attempt + 1`, or `None` to give up
    ///
    /// `attempt` counts failures so far, starting at 0.
    fn next_delay(&self, attempt: u32, error: &Error) -> Option<Duration>;
}

/// Never retry
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _attempt: u32, _error: &Error) -> Option<Duration> {
        None
    }
}

/// Exponential backoff on transient errors only
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl ExponentialBackoff {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if attempt >= self.max_retries || !error.is_transient() {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// Policy described by a config section; `max_retries = 0` means [`NoRetry`]
pub fn policy_from_config(config: &RetryConfig) -> Arc<dyn RetryPolicy> {
    if config.max_retries == 0 {
        Arc::new(NoRetry)
    } else {
        Arc::new(ExponentialBackoff::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        ))
    }
}
