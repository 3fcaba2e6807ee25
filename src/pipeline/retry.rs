//! Retry policy for the submission step

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry with exponential backoff
///
/// No delay before the first attempt, `initial_delay` before the second,
/// doubling before each attempt after that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles thereafter
    #[serde(default = "default_initial_delay", with = "humantime_serde")]
    pub initial_delay: Duration,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before the 1-based `attempt`; None for the first
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            return None;
        }
        let factor = 2u32.checked_pow(attempt - 2).unwrap_or(u32::MAX);
        Some(self.initial_delay.saturating_mul(factor))
    }
}
