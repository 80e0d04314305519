//! In-memory record store implementation using dashmap.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use pulso_core::result::AppResult;
use pulso_core::traits::store::RecordStore;

/// In-memory record store. Tables are created lazily on first write.
///
/// Suitable for single-node deployments and tests; every operation is
/// infallible, so the `AppResult` layer only ever carries `Ok` here.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: DashMap<String, DashMap<String, Value>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, table: &str, key: &str) -> AppResult<Option<Value>> {
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.get(key).map(|row| row.value().clone())))
    }

    async fn put(&self, table: &str, key: &str, record: Value) -> AppResult<()> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> AppResult<bool> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn list(&self, table: &str) -> AppResult<Vec<Value>> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.iter().map(|row| row.value().clone()).collect())
            .unwrap_or_default())
    }

    async fn find_by(&self, table: &str, field: &str, value: &Value) -> AppResult<Vec<Value>> {
        Ok(self
            .tables
            .get(table)
            .map(|t| {
                t.iter()
                    .filter(|row| row.value().get(field) == Some(value))
                    .map(|row| row.value().clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_by(&self, table: &str, field: &str, value: &Value) -> AppResult<u64> {
        let Some(t) = self.tables.get(table) else {
            return Ok(0);
        };

        // Collect keys first; removing while iterating can deadlock a shard.
        let keys: Vec<String> = t
            .iter()
            .filter(|row| row.value().get(field) == Some(value))
            .map(|row| row.key().clone())
            .collect();

        let mut count = 0u64;
        for key in &keys {
            if t.remove(key).is_some() {
                count += 1;
            }
        }

        debug!(table, field, count, "Deleted rows by field");
        Ok(count)
    }

    async fn count(&self, table: &str) -> AppResult<u64> {
        Ok(self.tables.get(table).map(|t| t.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryRecordStore::new();
        let row = json!({"id": "a", "name": "first"});
        store.put("things", "a", row.clone()).await.unwrap();
        assert_eq!(store.get("things", "a").await.unwrap(), Some(row));
        assert_eq!(store.get("things", "missing").await.unwrap(), None);
        assert_eq!(store.get("absent_table", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_row() {
        let store = MemoryRecordStore::new();
        store.put("things", "a", json!({"v": 1})).await.unwrap();
        store.put("things", "a", json!({"v": 2})).await.unwrap();
        assert_eq!(store.get("things", "a").await.unwrap(), Some(json!({"v": 2})));
        assert_eq!(store.count("things").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = MemoryRecordStore::new();
        store.put("things", "a", json!({})).await.unwrap();
        assert!(store.delete("things", "a").await.unwrap());
        assert!(!store.delete("things", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_matches_top_level_field() {
        let store = MemoryRecordStore::new();
        store
            .put("things", "a", json!({"owner": "u1", "n": 1}))
            .await
            .unwrap();
        store
            .put("things", "b", json!({"owner": "u2", "n": 2}))
            .await
            .unwrap();
        store
            .put("things", "c", json!({"owner": "u1", "n": 3}))
            .await
            .unwrap();

        let mine = store
            .find_by("things", "owner", &json!("u1"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|row| row["owner"] == json!("u1")));
    }

    #[tokio::test]
    async fn test_delete_by_removes_only_matches() {
        let store = MemoryRecordStore::new();
        store
            .put("things", "a", json!({"owner": "u1"}))
            .await
            .unwrap();
        store
            .put("things", "b", json!({"owner": "u2"}))
            .await
            .unwrap();

        let removed = store
            .delete_by("things", "owner", &json!("u1"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count("things").await.unwrap(), 1);
        assert_eq!(
            store.delete_by("things", "owner", &json!("u1")).await.unwrap(),
            0
        );
    }
}
