//! System health derived from windowed delivery metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use pulso_core::config::health::HealthConfig;
use pulso_core::result::AppResult;

use crate::metrics::{DeliveryMetrics, MetricsCollector};

/// Overall system health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All metrics within their target bounds.
    Healthy,
    /// At least one metric breached its target bound.
    Degraded,
    /// At least one metric breached its unhealthy bound.
    Unhealthy,
}

/// One health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Worst status across all checked metrics.
    pub status: HealthStatus,
    /// The metrics the verdict was derived from.
    pub metrics: DeliveryMetrics,
    /// One entry per breached threshold.
    pub issues: Vec<String>,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
}

/// Evaluates windowed metrics against configured thresholds.
///
/// An empty window never raises issues: with no attempts there is
/// nothing to judge, so the system reports healthy with zeroed metrics.
#[derive(Clone)]
pub struct HealthMonitor {
    collector: MetricsCollector,
    config: HealthConfig,
}

impl HealthMonitor {
    pub fn new(collector: MetricsCollector, config: HealthConfig) -> Self {
        Self { collector, config }
    }

    /// Evaluate health over the trailing metrics window.
    pub async fn get_system_health(&self) -> AppResult<HealthReport> {
        let metrics = self.collector.current_metrics().await?;
        let mut status = HealthStatus::Healthy;
        let mut issues = Vec::new();

        if metrics.attempted > 0 {
            if metrics.delivery_rate < self.config.unhealthy_delivery_rate {
                status = status.max(HealthStatus::Unhealthy);
                issues.push(format!(
                    "Delivery rate {:.1}% is below the unhealthy floor of {:.1}%",
                    metrics.delivery_rate * 100.0,
                    self.config.unhealthy_delivery_rate * 100.0
                ));
            } else if metrics.delivery_rate < self.config.min_delivery_rate {
                status = status.max(HealthStatus::Degraded);
                issues.push(format!(
                    "Delivery rate {:.1}% is below the {:.1}% target",
                    metrics.delivery_rate * 100.0,
                    self.config.min_delivery_rate * 100.0
                ));
            }

            if metrics.error_rate > self.config.unhealthy_error_rate {
                status = status.max(HealthStatus::Unhealthy);
                issues.push(format!(
                    "Error rate {:.1}% exceeds the unhealthy ceiling of {:.1}%",
                    metrics.error_rate * 100.0,
                    self.config.unhealthy_error_rate * 100.0
                ));
            } else if metrics.error_rate > self.config.max_error_rate {
                status = status.max(HealthStatus::Degraded);
                issues.push(format!(
                    "Error rate {:.1}% exceeds the {:.1}% ceiling",
                    metrics.error_rate * 100.0,
                    self.config.max_error_rate * 100.0
                ));
            }

            if metrics.average_delivery_ms > self.config.unhealthy_average_delivery_ms {
                status = status.max(HealthStatus::Unhealthy);
                issues.push(format!(
                    "Average delivery latency {:.0} ms exceeds the unhealthy ceiling of {:.0} ms",
                    metrics.average_delivery_ms, self.config.unhealthy_average_delivery_ms
                ));
            } else if metrics.average_delivery_ms > self.config.max_average_delivery_ms {
                status = status.max(HealthStatus::Degraded);
                issues.push(format!(
                    "Average delivery latency {:.0} ms exceeds the {:.0} ms ceiling",
                    metrics.average_delivery_ms, self.config.max_average_delivery_ms
                ));
            }
        }

        if status != HealthStatus::Healthy {
            warn!(?status, issues = issues.len(), "System health below healthy");
        }

        Ok(HealthReport {
            status,
            metrics,
            issues,
            checked_at: Utc::now(),
        })
    }
}
