//! Integration tests for batching, flush scheduling, and system health.

use std::time::Duration;

use serde_json::json;

use crate::helpers::{TestApp, draft};

use pulso::{
    AppConfig, BatchItem, BatchPriority, HealthStatus, InteractionKind, NotificationType,
};

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.batching.max_batch_size = 10;
    config.batching.flush_window_ms = 1_000;
    config.batching.poll_interval_ms = 100;
    config
}

#[tokio::test(start_paused = true)]
async fn test_window_flush_delivers_batched_items() {
    let app = TestApp::with_config(fast_config());
    let alice = app.consenting_user().await;
    let bob = app.consenting_user().await;

    app.services
        .batcher
        .add_to_batch(
            vec![
                BatchItem {
                    user_id: alice,
                    draft: draft(NotificationType::ExerciseReminder),
                },
                BatchItem {
                    user_id: bob,
                    draft: draft(NotificationType::ExerciseReminder),
                },
            ],
            BatchPriority::Normal,
        )
        .await;

    assert_eq!(app.services.batcher.pending_batches().await, 1);
    assert!(app.gateway.delivered().is_empty());

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert_eq!(app.services.batcher.pending_batches().await, 0);
    assert_eq!(app.gateway.delivered().len(), 2);
    let snapshot = app.services.batcher.metrics();
    assert_eq!(snapshot.batches_created, 1);
    assert_eq!(snapshot.batches_flushed, 1);
    assert_eq!(snapshot.items_dispatched, 2);
}

#[tokio::test(start_paused = true)]
async fn test_critical_items_bypass_the_window() {
    let app = TestApp::with_config(fast_config());
    let user = app.consenting_user().await;

    app.services
        .batcher
        .add_to_batch(
            vec![BatchItem {
                user_id: user,
                draft: draft(NotificationType::SystemAlert),
            }],
            BatchPriority::Critical,
        )
        .await;

    // The immediate flush needs a poll of the spawned task, not the window.
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(app.gateway.delivered().len(), 1);
    let snapshot = app.services.batcher.metrics();
    assert_eq!(snapshot.critical_bypasses, 1);
    assert_eq!(snapshot.batches_flushed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_pending_batches() {
    let mut config = fast_config();
    config.batching.flush_window_ms = 600_000;
    let app = TestApp::with_config(config);
    let user = app.consenting_user().await;

    app.services
        .batcher
        .add_to_batch(
            vec![BatchItem {
                user_id: user,
                draft: draft(NotificationType::ProgressUpdate),
            }],
            BatchPriority::Normal,
        )
        .await;
    assert!(app.gateway.delivered().is_empty());

    app.services.shutdown().await;

    assert_eq!(app.gateway.delivered().len(), 1);
}

#[tokio::test]
async fn test_confirmed_deliveries_keep_the_system_healthy() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    for _ in 0..5 {
        let report = app
            .services
            .engine
            .send(user, draft(NotificationType::TherapistMessage))
            .await
            .unwrap();
        app.services
            .analytics
            .track_interaction(report.notification_id, user, InteractionKind::Delivered, json!({}))
            .await
            .unwrap();
    }

    let health = app.services.health.get_system_health().await.unwrap();

    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.metrics.attempted, 5);
    assert_eq!(health.metrics.delivery_rate, 1.0);
    assert!(health.issues.is_empty());
}

#[tokio::test]
async fn test_missing_receipts_surface_as_unhealthy() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    for _ in 0..5 {
        app.services
            .engine
            .send(user, draft(NotificationType::TherapistMessage))
            .await
            .unwrap();
    }

    let health = app.services.health.get_system_health().await.unwrap();

    assert_eq!(health.status, HealthStatus::Unhealthy);
    assert!(health.issues.iter().any(|i| i.contains("Delivery rate")));
}
