//! Data portability and erasure.

use serde::Serialize;
use tracing::info;

use pulso_core::result::AppResult;
use pulso_core::types::id::UserId;
use pulso_entity::{ConsentRecord, Notification, Preferences, PushSubscription};
use pulso_store::{
    ConsentRepository, InteractionRepository, NotificationRepository, PreferenceRepository,
    SubscriptionRepository,
};

/// Everything the engine holds about one user, for portability requests.
#[derive(Debug, Serialize)]
pub struct UserDataExport {
    /// Active push subscriptions.
    pub subscriptions: Vec<PushSubscription>,
    /// The preference row, if one was ever created.
    pub preferences: Option<Preferences>,
    /// Full notification history, newest first.
    pub history: Vec<Notification>,
    /// The complete consent ledger, oldest first.
    pub consent: Vec<ConsentRecord>,
}

/// Read-only export and irreversible erasure of a user's data.
#[derive(Clone)]
pub struct PrivacyService {
    subscriptions: SubscriptionRepository,
    preferences: PreferenceRepository,
    notifications: NotificationRepository,
    consent: ConsentRepository,
    interactions: InteractionRepository,
}

impl PrivacyService {
    /// Create a privacy service over the per-table repositories.
    pub fn new(
        subscriptions: SubscriptionRepository,
        preferences: PreferenceRepository,
        notifications: NotificationRepository,
        consent: ConsentRepository,
        interactions: InteractionRepository,
    ) -> Self {
        Self {
            subscriptions,
            preferences,
            notifications,
            consent,
            interactions,
        }
    }

    /// Aggregate every record held for a user. Read-only.
    pub async fn export_user_data(&self, user_id: UserId) -> AppResult<UserDataExport> {
        Ok(UserDataExport {
            subscriptions: self.subscriptions.find_by_user(user_id).await?,
            preferences: self.preferences.get(user_id).await?,
            history: self.notifications.find_by_user(user_id).await?,
            consent: self.consent.find_by_user(user_id).await?,
        })
    }

    /// Irreversibly remove every record held for a user, across all five
    /// tables. Each delete is idempotent, so the operation may be safely
    /// re-invoked after a storage failure; the first failure is surfaced
    /// to the caller unchanged.
    pub async fn delete_user_data(&self, user_id: UserId) -> AppResult<()> {
        let subscriptions = self.subscriptions.delete_for_user(user_id).await?;
        let preferences = self.preferences.delete_for_user(user_id).await?;
        let history = self.notifications.delete_for_user(user_id).await?;
        let consent = self.consent.delete_for_user(user_id).await?;
        let interactions = self.interactions.delete_for_user(user_id).await?;

        info!(
            %user_id,
            subscriptions,
            preferences,
            history,
            consent,
            interactions,
            "User notification data erased"
        );
        Ok(())
    }
}
