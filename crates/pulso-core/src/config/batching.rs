//! Batching and dispatch configuration.

use serde::{Deserialize, Serialize};

/// Batching and dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Item count at which a batch flushes without waiting for the window.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Flush window in milliseconds. A batch older than this is dispatched
    /// on the next poll.
    #[serde(default = "default_flush_window")]
    pub flush_window_ms: u64,
    /// Interval in milliseconds between dispatch-loop polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            flush_window_ms: default_flush_window(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_max_batch_size() -> usize {
    50
}

fn default_flush_window() -> u64 {
    5_000
}

fn default_poll_interval() -> u64 {
    250
}
