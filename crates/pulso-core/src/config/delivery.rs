//! Delivery engine configuration.

use serde::{Deserialize, Serialize};

/// Delivery engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Maximum number of transport attempts per send (the first attempt
    /// counts as one).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between retry attempts in milliseconds. Attempt `n`
    /// waits `retry_delay_ms * n` before the next attempt.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Hard cap on the computed backoff delay in milliseconds.
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1_000
}

fn default_max_retry_delay() -> u64 {
    30_000
}
