//! Notification history repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pulso_core::result::AppResult;
use pulso_core::traits::store::RecordStore;
use pulso_core::types::id::{NotificationId, UserId};
use pulso_core::types::pagination::{PageRequest, PageResponse};
use pulso_entity::Notification;

use crate::tables;

/// Repository for the `notification_history` table.
#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<dyn RecordStore>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Insert or replace a notification row.
    pub async fn save(&self, notification: &Notification) -> AppResult<()> {
        let row = serde_json::to_value(notification)?;
        self.store
            .put(
                tables::NOTIFICATION_HISTORY,
                &notification.id.to_string(),
                row,
            )
            .await
    }

    /// Fetch a notification by id.
    pub async fn get(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        let row = self
            .store
            .get(tables::NOTIFICATION_HISTORY, &id.to_string())
            .await?;
        row.map(|r| serde_json::from_value(r).map_err(Into::into))
            .transpose()
    }

    /// All history rows for a user, newest first.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        let rows = self
            .store
            .find_by(
                tables::NOTIFICATION_HISTORY,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await?;

        let mut notifications = deserialize_rows(rows)?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// One page of a user's history, newest first.
    pub async fn find_by_user_paged(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let all = self.find_by_user(user_id).await?;
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    /// History rows whose activity timestamp falls in `[start, end]`.
    pub async fn find_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let rows = self.store.list(tables::NOTIFICATION_HISTORY).await?;
        let notifications = deserialize_rows(rows)?;
        Ok(notifications
            .into_iter()
            .filter(|n| {
                let at = n.activity_at();
                at >= start && at <= end
            })
            .collect())
    }

    /// Remove all history rows for a user. Returns the number removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64> {
        self.store
            .delete_by(
                tables::NOTIFICATION_HISTORY,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await
    }

    /// Retention sweep: remove rows created before `cutoff`. Returns the
    /// number removed.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let rows = self.store.list(tables::NOTIFICATION_HISTORY).await?;
        let old = deserialize_rows(rows)?
            .into_iter()
            .filter(|n| n.created_at < cutoff);

        let mut removed = 0u64;
        for notification in old {
            if self
                .store
                .delete(tables::NOTIFICATION_HISTORY, &notification.id.to_string())
                .await?
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn deserialize_rows(rows: Vec<serde_json::Value>) -> AppResult<Vec<Notification>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}
