//! Batched dispatch and operational insight on top of the delivery
//! engine: the notification batcher, windowed delivery metrics, the
//! system health check, and per-user send-time guidance.

pub mod batcher;
pub mod health;
pub mod metrics;
pub mod send_time;

pub use batcher::NotificationBatcher;
pub use health::{HealthMonitor, HealthReport, HealthStatus};
pub use metrics::{BatcherMetrics, BatcherSnapshot, DeliveryMetrics, MetricsCollector};
pub use send_time::SendTimeAdvisor;
