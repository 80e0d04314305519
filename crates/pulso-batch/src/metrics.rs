//! Dispatch counters and windowed delivery metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::config::health::HealthConfig;
use pulso_core::result::AppResult;
use pulso_entity::NotificationStatus;
use pulso_store::NotificationRepository;

/// Lifetime counters for the batcher, updated lock-free.
#[derive(Debug, Default)]
pub struct BatcherMetrics {
    batches_created: AtomicU64,
    batches_flushed: AtomicU64,
    items_dispatched: AtomicU64,
    critical_bypasses: AtomicU64,
}

impl BatcherMetrics {
    pub fn record_batch_created(&self) {
        self.batches_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_flushed(&self) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_items_dispatched(&self, count: u64) {
        self.items_dispatched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_critical_bypass(&self) {
        self.critical_bypasses.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> BatcherSnapshot {
        BatcherSnapshot {
            batches_created: self.batches_created.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            items_dispatched: self.items_dispatched.load(Ordering::Relaxed),
            critical_bypasses: self.critical_bypasses.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of the batcher counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherSnapshot {
    pub batches_created: u64,
    pub batches_flushed: u64,
    pub items_dispatched: u64,
    pub critical_bypasses: u64,
}

/// Windowed delivery metrics, recomputed from notification history on
/// every read and never persisted.
///
/// Rates are fractions in `[0, 1]`, always `0.0` when the denominator
/// is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryMetrics {
    /// Rows that reached the transport inside the window.
    pub attempted: u64,
    /// Fraction of attempts confirmed delivered.
    pub delivery_rate: f64,
    /// Mean milliseconds between transport accept and delivery
    /// confirmation.
    pub average_delivery_ms: f64,
    /// Fraction of delivered notifications that were clicked.
    pub click_through_rate: f64,
    /// Fraction of attempts that ended failed.
    pub error_rate: f64,
}

impl DeliveryMetrics {
    /// All-zero metrics for an empty window.
    pub fn empty() -> Self {
        Self {
            attempted: 0,
            delivery_rate: 0.0,
            average_delivery_ms: 0.0,
            click_through_rate: 0.0,
            error_rate: 0.0,
        }
    }
}

/// Computes [`DeliveryMetrics`] over notification history.
#[derive(Clone)]
pub struct MetricsCollector {
    notifications: NotificationRepository,
    window: Duration,
}

impl MetricsCollector {
    pub fn new(notifications: NotificationRepository, config: &HealthConfig) -> Self {
        Self {
            notifications,
            window: Duration::minutes(config.metrics_window_minutes as i64),
        }
    }

    /// Metrics over the trailing configured window, ending now.
    pub async fn current_metrics(&self) -> AppResult<DeliveryMetrics> {
        let end = Utc::now();
        self.metrics_for_window(end - self.window, end).await
    }

    /// Metrics over an explicit window.
    pub async fn metrics_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<DeliveryMetrics> {
        let rows = self.notifications.find_in_window(start, end).await?;

        let mut attempted = 0u64;
        let mut delivered = 0u64;
        let mut clicked = 0u64;
        let mut failed = 0u64;
        let mut latency_total_ms = 0i64;
        let mut latency_samples = 0u64;

        for row in &rows {
            if row.was_attempted() {
                attempted += 1;
            }
            if row.status.was_delivered() {
                delivered += 1;
            }
            if row.status == NotificationStatus::Clicked {
                clicked += 1;
            }
            if row.status == NotificationStatus::Failed {
                failed += 1;
            }
            if let (Some(sent_at), Some(delivered_at)) = (row.sent_at, row.delivered_at) {
                latency_total_ms += (delivered_at - sent_at).num_milliseconds();
                latency_samples += 1;
            }
        }

        let average_delivery_ms = if latency_samples == 0 {
            0.0
        } else {
            latency_total_ms as f64 / latency_samples as f64
        };

        Ok(DeliveryMetrics {
            attempted,
            delivery_rate: ratio(delivered, attempted),
            average_delivery_ms,
            click_through_rate: ratio(clicked, delivered),
            error_rate: ratio(failed, attempted),
        })
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use pulso_core::types::id::UserId;
    use pulso_entity::{Notification, NotificationDraft, NotificationType};
    use pulso_store::MemoryRecordStore;

    fn collector() -> (MetricsCollector, NotificationRepository) {
        let repo = NotificationRepository::new(Arc::new(MemoryRecordStore::new()));
        (
            MetricsCollector::new(repo.clone(), &HealthConfig::default()),
            repo,
        )
    }

    fn base_row(user_id: UserId) -> Notification {
        Notification::from_draft(
            user_id,
            NotificationDraft::new(NotificationType::SystemAlert, "t", "b"),
        )
    }

    fn delivered_row(user_id: UserId, latency_ms: i64) -> Notification {
        let mut row = base_row(user_id);
        let now = Utc::now();
        row.mark_sent(now - Duration::milliseconds(latency_ms));
        row.mark_delivered(now);
        row
    }

    fn failed_row(user_id: UserId) -> Notification {
        let mut row = base_row(user_id);
        row.mark_failed("timeout");
        row
    }

    #[tokio::test]
    async fn test_empty_window_yields_zeroes() {
        let (collector, _repo) = collector();

        let metrics = collector.current_metrics().await.unwrap();
        assert_eq!(metrics, DeliveryMetrics::empty());
        // Zero denominators must never poison the rates.
        assert!(!metrics.delivery_rate.is_nan());
        assert!(!metrics.click_through_rate.is_nan());
    }

    #[tokio::test]
    async fn test_rates_from_mixed_history() {
        let (collector, repo) = collector();
        let user_id = UserId::new();

        for _ in 0..3 {
            repo.save(&delivered_row(user_id, 1_000)).await.unwrap();
        }
        let mut clicked = delivered_row(user_id, 1_000);
        clicked.mark_clicked(Utc::now());
        repo.save(&clicked).await.unwrap();
        repo.save(&failed_row(user_id)).await.unwrap();

        let metrics = collector.current_metrics().await.unwrap();
        assert_eq!(metrics.attempted, 5);
        assert!((metrics.delivery_rate - 0.8).abs() < 1e-9);
        assert!((metrics.click_through_rate - 0.25).abs() < 1e-9);
        assert!((metrics.error_rate - 0.2).abs() < 1e-9);
        assert!((metrics.average_delivery_ms - 1_000.0).abs() < 50.0);
    }

    #[test]
    fn test_batcher_counters_accumulate() {
        let metrics = BatcherMetrics::default();
        metrics.record_batch_created();
        metrics.record_batch_created();
        metrics.record_batch_flushed();
        metrics.record_items_dispatched(7);
        metrics.record_critical_bypass();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_created, 2);
        assert_eq!(snapshot.batches_flushed, 1);
        assert_eq!(snapshot.items_dispatched, 7);
        assert_eq!(snapshot.critical_bypasses, 1);
    }
}
