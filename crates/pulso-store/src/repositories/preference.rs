//! Preference repository with a read-through cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use pulso_core::config::store::StoreConfig;
use pulso_core::result::AppResult;
use pulso_core::traits::store::RecordStore;
use pulso_core::types::id::UserId;
use pulso_entity::Preferences;

use crate::tables;

/// Repository for the `notification_preferences` table.
///
/// Reads go through a moka cache sized and expired per `StoreConfig`;
/// every write invalidates the cached entry so the next read observes
/// the stored row. The store row is authoritative, the cache is only a
/// hot path for the per-send preference check.
#[derive(Clone)]
pub struct PreferenceRepository {
    store: Arc<dyn RecordStore>,
    cache: Cache<UserId, Preferences>,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(store: Arc<dyn RecordStore>, config: &StoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.preference_cache_capacity)
            .time_to_live(Duration::from_secs(config.preference_cache_ttl_seconds))
            .build();
        Self { store, cache }
    }

    /// Fetch a user's preferences, if a row exists.
    pub async fn get(&self, user_id: UserId) -> AppResult<Option<Preferences>> {
        if let Some(cached) = self.cache.get(&user_id).await {
            return Ok(Some(cached));
        }

        let row = self
            .store
            .get(tables::NOTIFICATION_PREFERENCES, &user_id.to_string())
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let preferences: Preferences = serde_json::from_value(row)?;
        self.cache.insert(user_id, preferences.clone()).await;
        Ok(Some(preferences))
    }

    /// Insert or replace a user's preference row.
    pub async fn upsert(&self, preferences: &Preferences) -> AppResult<()> {
        let row = serde_json::to_value(preferences)?;
        self.store
            .put(
                tables::NOTIFICATION_PREFERENCES,
                &preferences.user_id.to_string(),
                row,
            )
            .await?;
        self.cache.invalidate(&preferences.user_id).await;
        Ok(())
    }

    /// Remove a user's preference row. Returns the number removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64> {
        let removed = self
            .store
            .delete(tables::NOTIFICATION_PREFERENCES, &user_id.to_string())
            .await?;
        self.cache.invalidate(&user_id).await;
        Ok(u64::from(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecordStore;
    use pulso_entity::PreferencesPatch;

    fn repo() -> PreferenceRepository {
        PreferenceRepository::new(Arc::new(MemoryRecordStore::new()), &StoreConfig::default())
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = repo();
        assert!(repo.get(UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let repo = repo();
        let user = UserId::new();
        let prefs = Preferences::default_for_user(user);
        repo.upsert(&prefs).await.unwrap();

        let loaded = repo.get(user).await.unwrap().unwrap();
        assert!(loaded.appointment_reminders);
        // Second read comes from the cache and must agree.
        let cached = repo.get(user).await.unwrap().unwrap();
        assert_eq!(cached.updated_at, loaded.updated_at);
    }

    #[tokio::test]
    async fn test_write_invalidates_cached_entry() {
        let repo = repo();
        let user = UserId::new();
        let mut prefs = Preferences::default_for_user(user);
        repo.upsert(&prefs).await.unwrap();
        // Warm the cache.
        assert!(repo.get(user).await.unwrap().is_some());

        prefs.apply(PreferencesPatch {
            payment_reminders: Some(false),
            ..Default::default()
        });
        repo.upsert(&prefs).await.unwrap();

        let loaded = repo.get(user).await.unwrap().unwrap();
        assert!(!loaded.payment_reminders);
    }

    #[tokio::test]
    async fn test_delete_clears_row_and_cache() {
        let repo = repo();
        let user = UserId::new();
        repo.upsert(&Preferences::default_for_user(user))
            .await
            .unwrap();
        assert!(repo.get(user).await.unwrap().is_some());

        assert_eq!(repo.delete_for_user(user).await.unwrap(), 1);
        assert!(repo.get(user).await.unwrap().is_none());
        assert_eq!(repo.delete_for_user(user).await.unwrap(), 0);
    }
}
