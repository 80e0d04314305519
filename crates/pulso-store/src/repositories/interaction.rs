//! Notification interaction repository.

use std::sync::Arc;

use pulso_core::result::AppResult;
use pulso_core::traits::store::RecordStore;
use pulso_core::types::id::UserId;
use pulso_entity::InteractionEvent;

use crate::tables;

/// Repository for the `notification_interactions` table.
#[derive(Clone)]
pub struct InteractionRepository {
    store: Arc<dyn RecordStore>,
}

impl InteractionRepository {
    /// Create a new interaction repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Append a raw interaction event.
    pub async fn append(&self, event: &InteractionEvent) -> AppResult<()> {
        let row = serde_json::to_value(event)?;
        self.store
            .put(tables::NOTIFICATION_INTERACTIONS, &event.id.to_string(), row)
            .await
    }

    /// All interaction events for a user, oldest first.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<InteractionEvent>> {
        let rows = self
            .store
            .find_by(
                tables::NOTIFICATION_INTERACTIONS,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await?;

        let mut events: Vec<InteractionEvent> = rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect::<AppResult<_>>()?;
        events.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(events)
    }

    /// Remove every interaction event for a user. Returns the number
    /// removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64> {
        self.store
            .delete_by(
                tables::NOTIFICATION_INTERACTIONS,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await
    }
}
