//! Shared test helpers for integration tests.

use std::sync::Arc;

use pulso::bootstrap::Services;
use pulso::{
    AppConfig, ConsentInput, MemoryGateway, NotificationDraft, NotificationType, UserId,
};

/// Test application context
pub struct TestApp {
    /// Fully wired services over a fresh in-memory store
    pub services: Services,
    /// The scriptable push transport behind the delivery engine
    pub gateway: Arc<MemoryGateway>,
}

impl TestApp {
    /// Wire a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Wire a new test application with the given configuration
    pub fn with_config(config: AppConfig) -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        let services =
            Services::build(config, gateway.clone()).expect("Failed to build services");
        Self { services, gateway }
    }

    /// Create a user with an affirmative consent record and return their id
    pub async fn consenting_user(&self) -> UserId {
        let user_id = UserId::new();
        self.services
            .consent
            .record_consent(ConsentInput {
                user_id,
                notifications_enabled: true,
                data_processing_consent: true,
                analytics_consent: true,
                marketing_consent: false,
                origin_address: "203.0.113.10".to_string(),
                user_agent: "integration-tests".to_string(),
            })
            .await
            .expect("Failed to record consent");
        user_id
    }
}

/// A harmless draft for tests where the content does not matter
pub fn draft(kind: NotificationType) -> NotificationDraft {
    NotificationDraft::new(kind, "Session tomorrow", "Your session starts at 14:00.")
}
