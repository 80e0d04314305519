//! Record store and cache configuration.

use serde::{Deserialize, Serialize};

/// Record store and preference cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of preference records held in the read-through cache.
    #[serde(default = "default_cache_capacity")]
    pub preference_cache_capacity: u64,
    /// Time-to-live for cached preference records, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub preference_cache_ttl_seconds: u64,
    /// Number of days notification history rows are retained before the
    /// purge sweep removes them.
    #[serde(default = "default_retention_days")]
    pub history_retention_days: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            preference_cache_capacity: default_cache_capacity(),
            preference_cache_ttl_seconds: default_cache_ttl(),
            history_retention_days: default_retention_days(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_retention_days() -> u32 {
    90
}
