//! Composition root: wires the store, compliance layer, delivery
//! engine, batcher, and analytics into one [`Services`] value.
//!
//! Construction is explicit; there is no global singleton. The embedding
//! application builds an [`AppConfig`], supplies a [`PushGateway`]
//! implementation, and calls [`Services::build`] from within a Tokio
//! runtime (the batcher spawns its dispatch loop on creation).

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use pulso_analytics::{AnalyticsService, PerformanceReport};
use pulso_batch::{HealthMonitor, MetricsCollector, NotificationBatcher, SendTimeAdvisor};
use pulso_compliance::{ConsentLedger, PayloadCipher, PrivacyService};
use pulso_core::AppResult;
use pulso_core::config::AppConfig;
use pulso_core::config::logging::LoggingConfig;
use pulso_core::traits::push::PushGateway;
use pulso_core::traits::store::RecordStore;
use pulso_delivery::{DeliveryEngine, PreferenceBus, PreferenceService, RetryPolicy};
use pulso_store::{
    ConsentRepository, InteractionRepository, MemoryRecordStore, NotificationRepository,
    PreferenceRepository, SubscriptionRepository,
};

/// Initialize tracing/logging from the logging section.
///
/// `RUST_LOG` wins over the configured level. Call once per process.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// The fully wired engine.
pub struct Services {
    /// The configuration the services were built from.
    pub config: AppConfig,
    /// Notification history rows.
    pub notifications: NotificationRepository,
    /// Push subscription rows.
    pub subscriptions: SubscriptionRepository,
    /// Raw interaction rows.
    pub interactions: InteractionRepository,
    /// Append-only consent ledger and send-path consent gate.
    pub consent: ConsentLedger,
    /// Data portability and erasure.
    pub privacy: PrivacyService,
    /// Preference reads/writes plus the change bus.
    pub preferences: PreferenceService,
    /// The send path.
    pub engine: DeliveryEngine,
    /// Window/size batching on top of the engine.
    pub batcher: NotificationBatcher,
    /// Trailing-window delivery metrics.
    pub metrics: MetricsCollector,
    /// Two-tier system health evaluation.
    pub health: HealthMonitor,
    /// Per-user optimal send-time guidance.
    pub send_time: SendTimeAdvisor,
    /// Trends, engagement, reports, CSV export, interaction tracking.
    pub analytics: AnalyticsService,
}

impl Services {
    /// Wire every service against a fresh in-memory record store.
    ///
    /// Must be called from within a Tokio runtime. Fails only when the
    /// compliance section carries an unusable encryption key.
    pub fn build(config: AppConfig, gateway: Arc<dyn PushGateway>) -> AppResult<Self> {
        // ── Step 1: Record store + repositories ──────────────────
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let notifications = NotificationRepository::new(Arc::clone(&store));
        let subscriptions = SubscriptionRepository::new(Arc::clone(&store));
        let preference_repo = PreferenceRepository::new(Arc::clone(&store), &config.store);
        let consent_repo = ConsentRepository::new(Arc::clone(&store));
        let interactions = InteractionRepository::new(Arc::clone(&store));

        // ── Step 2: Compliance layer ─────────────────────────────
        let consent = ConsentLedger::new(consent_repo.clone());
        let cipher = PayloadCipher::new(&config.compliance)?;
        let privacy = PrivacyService::new(
            subscriptions.clone(),
            preference_repo.clone(),
            notifications.clone(),
            consent_repo,
            interactions.clone(),
        );

        // ── Step 3: Preference service + change bus ──────────────
        let preferences = PreferenceService::new(preference_repo, PreferenceBus::default());

        // ── Step 4: Delivery engine ──────────────────────────────
        let engine = DeliveryEngine::new(
            gateway,
            notifications.clone(),
            subscriptions.clone(),
            preferences.clone(),
            consent.clone(),
            cipher,
            RetryPolicy::from_config(&config.delivery),
        );

        // ── Step 5: Batching, metrics, health ────────────────────
        let batcher = NotificationBatcher::new(engine.clone(), config.batching.clone());
        let metrics = MetricsCollector::new(notifications.clone(), &config.health);
        let health = HealthMonitor::new(metrics.clone(), config.health.clone());
        let send_time = SendTimeAdvisor::new(notifications.clone());

        // ── Step 6: Analytics ────────────────────────────────────
        let analytics = AnalyticsService::new(notifications.clone(), interactions.clone());

        info!("Pulso services wired");
        Ok(Self {
            config,
            notifications,
            subscriptions,
            interactions,
            consent,
            privacy,
            preferences,
            engine,
            batcher,
            metrics,
            health,
            send_time,
            analytics,
        })
    }

    /// Performance report over the configured trailing window ending now.
    pub async fn recent_performance_report(&self) -> AppResult<PerformanceReport> {
        let end = Utc::now();
        let start = end - Duration::days(self.config.analytics.default_window_days as i64);
        self.analytics.performance_report(start, end).await
    }

    /// Drop notification history older than the configured retention.
    /// Returns the number of rows removed. Invoked by the operator;
    /// nothing schedules this internally.
    pub async fn run_retention_sweep(&self) -> AppResult<u64> {
        let retention_days = self.config.store.history_retention_days;
        let cutoff = Utc::now() - Duration::days(retention_days as i64);
        let removed = self.notifications.purge_older_than(cutoff).await?;
        info!(removed, retention_days, "purged expired notification history");
        Ok(removed)
    }

    /// Flush pending batches and stop the dispatch loop.
    pub async fn shutdown(&self) {
        self.batcher.shutdown().await;
        info!("Pulso services stopped");
    }
}
