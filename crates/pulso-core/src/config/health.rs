//! System health threshold configuration.

use serde::{Deserialize, Serialize};

/// Thresholds used to derive the overall system health status.
///
/// Rates are fractions in `[0, 1]`. Each metric has a degraded bound and
/// an unhealthy bound; breaching the former reports an issue, breaching
/// the latter forces the `unhealthy` status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Length of the sliding window the metrics snapshot covers, in minutes.
    #[serde(default = "default_window_minutes")]
    pub metrics_window_minutes: u64,
    /// Delivery rate below this is degraded.
    #[serde(default = "default_min_delivery_rate")]
    pub min_delivery_rate: f64,
    /// Delivery rate below this is unhealthy.
    #[serde(default = "default_unhealthy_delivery_rate")]
    pub unhealthy_delivery_rate: f64,
    /// Error rate above this is degraded.
    #[serde(default = "default_max_error_rate")]
    pub max_error_rate: f64,
    /// Error rate above this is unhealthy.
    #[serde(default = "default_unhealthy_error_rate")]
    pub unhealthy_error_rate: f64,
    /// Average delivery latency above this is degraded, in milliseconds.
    #[serde(default = "default_max_average_delivery_ms")]
    pub max_average_delivery_ms: f64,
    /// Average delivery latency above this is unhealthy, in milliseconds.
    #[serde(default = "default_unhealthy_average_delivery_ms")]
    pub unhealthy_average_delivery_ms: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            metrics_window_minutes: default_window_minutes(),
            min_delivery_rate: default_min_delivery_rate(),
            unhealthy_delivery_rate: default_unhealthy_delivery_rate(),
            max_error_rate: default_max_error_rate(),
            unhealthy_error_rate: default_unhealthy_error_rate(),
            max_average_delivery_ms: default_max_average_delivery_ms(),
            unhealthy_average_delivery_ms: default_unhealthy_average_delivery_ms(),
        }
    }
}

fn default_window_minutes() -> u64 {
    60
}

fn default_min_delivery_rate() -> f64 {
    0.85
}

fn default_unhealthy_delivery_rate() -> f64 {
    0.70
}

fn default_max_error_rate() -> f64 {
    0.10
}

fn default_unhealthy_error_rate() -> f64 {
    0.25
}

fn default_max_average_delivery_ms() -> f64 {
    5_000.0
}

fn default_unhealthy_average_delivery_ms() -> f64 {
    15_000.0
}
