//! Client configuration types.

use std::time::Duration;

/// Default number of attempts for one store operation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 25;

/// Default backoff unit; attempt `n` waits `n^2` of these
pub const DEFAULT_DELAY_UNIT: Duration = Duration::from_secs(1);

/// Retry policy for store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Unit the quadratic backoff is measured in
    pub delay_unit: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_unit: DEFAULT_DELAY_UNIT,
        }
    }

    /// Set maximum attempts
    #[must_use]
    pub const fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the backoff unit
    #[must_use]
    pub const fn delay_unit(mut self, unit: Duration) -> Self {
        self.delay_unit = unit;
        self
    }

    /// Delay after the given failed attempt (1-based): `attempt^2` units
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_unit.saturating_mul(attempt.saturating_mul(attempt))
    }
}

/// Client-side request rate limit for the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,

    /// Requests allowed in a burst
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    /// Create a rate limit configuration
    #[must_use]
    pub const fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 25);
        assert_eq!(config.delay_unit, Duration::from_secs(1));
    }

    #[test]
    fn test_quadratic_delay() {
        let config = RetryConfig::new().delay_unit(Duration::from_millis(10));
        assert_eq!(config.delay_for(1), Duration::from_millis(10));
        assert_eq!(config.delay_for(2), Duration::from_millis(40));
        assert_eq!(config.delay_for(5), Duration::from_millis(250));
        assert_eq!(RetryConfig::new().delay_for(24), Duration::from_secs(576));
    }

    #[test]
    fn test_delay_saturates() {
        let config = RetryConfig::new().delay_unit(Duration::MAX);
        assert_eq!(config.delay_for(3), Duration::MAX);
    }
}
