//! Push subscription entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::traits::push::SubscriptionHandle;
use pulso_core::types::id::{SubscriptionId, UserId};

/// One active push endpoint per device per user.
///
/// Created on subscribe, removed on unsubscribe or when the transport
/// reports the endpoint permanently gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Unique subscription identifier.
    pub id: SubscriptionId,
    /// The owning user.
    pub user_id: UserId,
    /// Opaque transport address.
    pub endpoint: String,
    /// Public key for payload encryption at the transport layer.
    pub p256dh: String,
    /// Shared authentication secret.
    pub auth: String,
    /// User agent of the registering device.
    pub user_agent: String,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// When the subscription row was last written.
    pub updated_at: DateTime<Utc>,
}

impl PushSubscription {
    /// Create a subscription row from a transport registration.
    pub fn from_handle(user_id: UserId, handle: SubscriptionHandle, user_agent: String) -> Self {
        let now = Utc::now();
        Self {
            id: SubscriptionId::new(),
            user_id,
            endpoint: handle.endpoint,
            p256dh: handle.keys.p256dh,
            auth: handle.keys.auth,
            user_agent,
            created_at: now,
            updated_at: now,
        }
    }
}
