//! Append-only consent ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::types::id::{ConsentId, UserId};

/// Caller-supplied consent decision, one toggle per purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentInput {
    /// The consenting user.
    pub user_id: UserId,
    /// Push notifications may be delivered.
    pub notifications_enabled: bool,
    /// Personal data may be processed for delivery.
    pub data_processing_consent: bool,
    /// Delivery outcomes may feed analytics.
    pub analytics_consent: bool,
    /// Marketing content may be sent.
    pub marketing_consent: bool,
    /// Address the decision originated from.
    pub origin_address: String,
    /// User agent of the consenting device.
    pub user_agent: String,
}

/// One immutable ledger entry. Entries are never mutated, only
/// superseded; the newest entry per user is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Unique ledger entry identifier.
    pub id: ConsentId,
    /// The consenting user.
    pub user_id: UserId,
    /// Push notifications may be delivered.
    pub notifications_enabled: bool,
    /// Personal data may be processed for delivery.
    pub data_processing_consent: bool,
    /// Delivery outcomes may feed analytics.
    pub analytics_consent: bool,
    /// Marketing content may be sent.
    pub marketing_consent: bool,
    /// When the decision was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Address the decision originated from.
    pub origin_address: String,
    /// User agent of the consenting device.
    pub user_agent: String,
}

impl ConsentRecord {
    /// Seal a caller decision into a ledger entry.
    pub fn from_input(input: ConsentInput) -> Self {
        Self {
            id: ConsentId::new(),
            user_id: input.user_id,
            notifications_enabled: input.notifications_enabled,
            data_processing_consent: input.data_processing_consent,
            analytics_consent: input.analytics_consent,
            marketing_consent: input.marketing_consent,
            recorded_at: Utc::now(),
            origin_address: input.origin_address,
            user_agent: input.user_agent,
        }
    }

    /// Whether this entry permits notification processing at all.
    pub fn permits_delivery(&self) -> bool {
        self.notifications_enabled && self.data_processing_consent
    }
}
