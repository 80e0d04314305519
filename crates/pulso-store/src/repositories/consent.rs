//! Consent ledger repository.

use std::sync::Arc;

use pulso_core::result::AppResult;
use pulso_core::traits::store::RecordStore;
use pulso_core::types::id::UserId;
use pulso_entity::ConsentRecord;

use crate::tables;

/// Repository for the `notification_consent` table.
///
/// The ledger is append-only: rows are keyed by their own id and never
/// rewritten, so a user's history of decisions stays intact until an
/// erasure request removes it wholesale.
#[derive(Clone)]
pub struct ConsentRepository {
    store: Arc<dyn RecordStore>,
}

impl ConsentRepository {
    /// Create a new consent repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Append a ledger entry.
    pub async fn append(&self, record: &ConsentRecord) -> AppResult<()> {
        let row = serde_json::to_value(record)?;
        self.store
            .put(tables::NOTIFICATION_CONSENT, &record.id.to_string(), row)
            .await
    }

    /// All ledger entries for a user, oldest first.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ConsentRecord>> {
        let rows = self
            .store
            .find_by(
                tables::NOTIFICATION_CONSENT,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await?;

        let mut records: Vec<ConsentRecord> = rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect::<AppResult<_>>()?;
        records.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(records)
    }

    /// The newest ledger entry for a user (the authoritative one).
    pub async fn latest_for_user(&self, user_id: UserId) -> AppResult<Option<ConsentRecord>> {
        Ok(self.find_by_user(user_id).await?.pop())
    }

    /// Remove every ledger entry for a user. Returns the number removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> AppResult<u64> {
        self.store
            .delete_by(
                tables::NOTIFICATION_CONSENT,
                "user_id",
                &serde_json::to_value(user_id)?,
            )
            .await
    }
}
