//! # pulso
//!
//! Notification delivery and preference engine for clinic operations.
//! This crate is the library facade over the workspace: it re-exports
//! the public surface of the member crates and provides the
//! [`bootstrap`] composition root that wires them together.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pulso::bootstrap::{Services, init_logging};
//! use pulso::{AppConfig, MemoryGateway};
//!
//! # async fn demo() -> pulso::AppResult<()> {
//! let config = AppConfig::load("development")?;
//! init_logging(&config.logging);
//! let services = Services::build(config, Arc::new(MemoryGateway::new()))?;
//!
//! let health = services.health.get_system_health().await?;
//! println!("{:?}", health.status);
//! services.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;

pub use bootstrap::{Services, init_logging};

pub use pulso_core::config::AppConfig;
pub use pulso_core::error::ErrorKind;
pub use pulso_core::traits::push::{
    PermissionState, PushGateway, PushMessage, SubscriptionHandle, TransportError,
};
pub use pulso_core::traits::store::RecordStore;
pub use pulso_core::types::id::{
    ConsentId, InteractionId, NotificationId, SubscriptionId, UserId,
};
pub use pulso_core::types::pagination::{PageRequest, PageResponse};
pub use pulso_core::types::time::TimeOfDay;
pub use pulso_core::{AppError, AppResult};

pub use pulso_entity::{
    Batch, BatchId, BatchItem, BatchPriority, ConsentInput, ConsentRecord, InteractionEvent,
    InteractionKind, Notification, NotificationDraft, NotificationStatus, NotificationType,
    Preferences, PreferencesPatch, PushSubscription, QuietHours,
};

pub use pulso_store::MemoryRecordStore;

pub use pulso_compliance::{
    ConsentLedger, ContentValidator, PayloadCipher, PrivacyService, UserDataExport,
    ValidationReport,
};

pub use pulso_delivery::{
    DeliveryEngine, InvokeChannel, InvokeGateway, MemoryGateway, PreferenceBus,
    PreferenceService, PreferenceSubscription, RetryPolicy, SendDecision, SendReport,
};

pub use pulso_batch::{
    DeliveryMetrics, HealthMonitor, HealthReport, HealthStatus, MetricsCollector,
    NotificationBatcher, SendTimeAdvisor,
};

pub use pulso_analytics::{
    AnalyticsService, EngagementCohorts, EngagementOverview, PerformanceReport, TrendPoint,
    TypePerformance, UserEngagement,
};
