//! Consent ledger service.

use tracing::info;

use pulso_core::error::AppError;
use pulso_core::result::AppResult;
use pulso_core::types::id::UserId;
use pulso_entity::{ConsentInput, ConsentRecord};
use pulso_store::ConsentRepository;

/// Append-only ledger of consent decisions plus the gate every other
/// component consults before processing a user's data.
#[derive(Clone)]
pub struct ConsentLedger {
    consent: ConsentRepository,
}

impl ConsentLedger {
    /// Create a consent ledger over its repository.
    pub fn new(consent: ConsentRepository) -> Self {
        Self { consent }
    }

    /// Append a consent decision. The new entry supersedes all earlier
    /// ones for the user; nothing is ever rewritten.
    pub async fn record_consent(&self, input: ConsentInput) -> AppResult<ConsentRecord> {
        let record = ConsentRecord::from_input(input);
        self.consent.append(&record).await?;
        info!(
            user_id = %record.user_id,
            notifications = record.notifications_enabled,
            data_processing = record.data_processing_consent,
            "Consent recorded"
        );
        Ok(record)
    }

    /// The authoritative (newest) consent entry for a user.
    pub async fn latest(&self, user_id: UserId) -> AppResult<Option<ConsentRecord>> {
        self.consent.latest_for_user(user_id).await
    }

    /// Gate for the delivery path: the newest entry must enable both
    /// notifications and data processing.
    pub async fn ensure_allowed(&self, user_id: UserId) -> AppResult<()> {
        match self.latest(user_id).await? {
            Some(record) if record.permits_delivery() => Ok(()),
            Some(_) => Err(AppError::consent_missing(
                "Latest consent entry does not permit notification delivery",
            )),
            None => Err(AppError::consent_missing(
                "No consent on record for this user",
            )),
        }
    }
}
