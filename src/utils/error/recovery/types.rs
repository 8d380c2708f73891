//! Recovery configuration types

use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Build a retry configuration from a retry count and backoff bounds
    pub fn from_retries(max_retries: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts: max_retries.saturating_add(1),
            base_delay: initial,
            max_delay: max.max(initial),
            backoff_multiplier: 2.0,
        }
    }
}
