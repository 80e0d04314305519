//! Push subscription repository.

use std::sync::Arc;

use pulso_core::result::AppResult;
use pulso_core::traits::store::RecordStore;
use pulso_core::types::id::UserId;
use pulso_entity::PushSubscription;

use crate::tables;

/// Repository for the `push_subscriptions` table.
#[derive(Clone)]
pub struct SubscriptionRepository {
    store: Arc<dyn RecordStore>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Insert or replace a subscription row.
    pub async fn save(&self, subscription: &PushSubscription) -> AppResult<()> {
        let row = serde_json::to_value(subscription)?;
        self.store
            .put(
                tables::PUSH_SUBSCRIPTIONS,
                &subscription.id.to_string(),
                row,
            )
            .await
    }

    /// All active subscriptions for a user.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<PushSubscription>> {
        let rows = self
            .store
            .find_by(
                tables::PUSH_SUBSCRIPTIONS,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Remove every subscription for a user. Returns the number removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64> {
        self.store
            .delete_by(
                tables::PUSH_SUBSCRIPTIONS,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecordStore;
    use pulso_core::traits::push::{SubscriptionHandle, SubscriptionKeys};

    fn handle(endpoint: &str) -> SubscriptionHandle {
        SubscriptionHandle {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: "pk".into(),
                auth: "secret".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_save_find_delete() {
        let repo = SubscriptionRepository::new(Arc::new(MemoryRecordStore::new()));
        let user = UserId::new();
        let phone =
            PushSubscription::from_handle(user, handle("https://push/phone"), "phone".into());
        let laptop =
            PushSubscription::from_handle(user, handle("https://push/laptop"), "laptop".into());
        repo.save(&phone).await.unwrap();
        repo.save(&laptop).await.unwrap();

        let mine = repo.find_by_user(user).await.unwrap();
        assert_eq!(mine.len(), 2);

        assert_eq!(repo.delete_for_user(user).await.unwrap(), 2);
        assert!(repo.find_by_user(user).await.unwrap().is_empty());
        assert_eq!(repo.delete_for_user(user).await.unwrap(), 0);
    }
}
