//! Analytics configuration.

use serde::{Deserialize, Serialize};

/// Analytics reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window, in days, used by reports when the caller does
    /// not supply explicit bounds.
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
        }
    }
}

fn default_window_days() -> u32 {
    30
}
