//! Push gateway backed by a remote function-invoke channel.
//!
//! Delivery goes through a single named function call. The channel is
//! expected to answer with `{"data": {"success": bool}, "error": ...}`;
//! a non-null `error` fails the attempt, and error text mentioning a
//! gone or expired endpoint is treated as permanent.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use pulso_core::result::AppResult;
use pulso_core::traits::push::{
    PermissionState, PushGateway, PushMessage, SubscriptionHandle, TransportError,
};
use pulso_core::types::id::UserId;

/// The remote function the gateway invokes per delivery.
const SEND_FUNCTION: &str = "send-notification";

/// A remote function-call boundary.
#[async_trait]
pub trait InvokeChannel: Send + Sync + 'static {
    /// Call a named remote function with a JSON payload and return its
    /// JSON response.
    async fn invoke(&self, function: &str, payload: Value) -> AppResult<Value>;
}

/// [`PushGateway`] that forwards deliveries over an [`InvokeChannel`].
///
/// This adapter runs server-side: there is no permission prompt to
/// show, so permission always reads as granted, and device
/// registration is out of reach, so `register` reports unavailable.
/// Subscription rows are expected to arrive from the registering
/// devices themselves.
#[derive(Clone)]
pub struct InvokeGateway {
    channel: Arc<dyn InvokeChannel>,
}

impl InvokeGateway {
    pub fn new(channel: Arc<dyn InvokeChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl PushGateway for InvokeGateway {
    async fn permission_state(&self) -> AppResult<PermissionState> {
        Ok(PermissionState::Granted)
    }

    async fn request_permission(&self) -> AppResult<PermissionState> {
        Ok(PermissionState::Granted)
    }

    async fn register(&self) -> AppResult<Option<SubscriptionHandle>> {
        debug!("Invoke gateway cannot register devices");
        Ok(None)
    }

    async fn unregister(&self) -> AppResult<bool> {
        Ok(false)
    }

    async fn deliver(&self, user_id: UserId, message: &PushMessage) -> Result<(), TransportError> {
        let payload = json!({
            "userId": user_id,
            "notification": message,
        });

        let response = self
            .channel
            .invoke(SEND_FUNCTION, payload)
            .await
            .map_err(|e| TransportError::Transient(e.to_string()))?;

        if let Some(error) = response.get("error").filter(|v| !v.is_null()) {
            let reason = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            let lowered = reason.to_ascii_lowercase();
            if lowered.contains("gone") || lowered.contains("expired") {
                return Err(TransportError::EndpointGone(reason));
            }
            return Err(TransportError::Transient(reason));
        }

        let success = response
            .pointer("/data/success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if success {
            Ok(())
        } else {
            Err(TransportError::Transient(
                "Transport reported failure without detail".to_string(),
            ))
        }
    }
}
