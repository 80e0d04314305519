//! Retry policy for transient transport failures.

use std::time::Duration;

use pulso_core::config::delivery::DeliveryConfig;

/// Controls how many transport attempts a send makes and how long it
/// waits between them.
///
/// The backoff is linear: after attempt `n` (1-indexed) the engine
/// waits `base_delay * n`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of transport attempts, the first call included.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub base_delay: Duration,
    /// Hard cap on the computed delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy from delivery configuration.
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.retry_delay_ms),
            max_delay: Duration::from_millis(config.max_retry_delay_ms),
        }
    }

    /// A policy that makes exactly one attempt and never sleeps.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Whether another attempt is allowed after `attempts` calls so far.
    pub fn allows_another(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Delay to wait after the given 1-indexed attempt failed.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(attempt.max(1))
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(30_000),
        };

        assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(3_000));
    }

    #[test]
    fn test_delay_respects_cap() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(2_500),
        };

        assert_eq!(policy.delay_after_attempt(5), Duration::from_millis(2_500));
    }

    #[test]
    fn test_allows_another_stops_at_max() {
        let policy = RetryPolicy::from_config(&DeliveryConfig::default());

        assert_eq!(policy.max_attempts, 3);
        assert!(policy.allows_another(1));
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[test]
    fn test_no_retry_makes_single_attempt() {
        let policy = RetryPolicy::no_retry();

        assert!(!policy.allows_another(1));
        assert_eq!(policy.delay_after_attempt(1), Duration::ZERO);
    }

    #[test]
    fn test_from_config_floors_attempts_at_one() {
        let config = DeliveryConfig {
            max_retries: 0,
            ..DeliveryConfig::default()
        };

        assert_eq!(RetryPolicy::from_config(&config).max_attempts, 1);
    }
}
