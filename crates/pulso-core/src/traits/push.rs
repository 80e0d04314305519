//! Push transport trait for the external delivery boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::AppResult;
use crate::types::id::UserId;

/// Platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    /// The user has granted notification permission.
    Granted,
    /// The user has declined notification permission.
    Denied,
    /// The user has not been asked yet.
    Prompt,
}

/// The two opaque cryptographic keys of a push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Public key for payload encryption on the transport side.
    pub p256dh: String,
    /// Shared authentication secret.
    pub auth: String,
}

/// A transport-issued subscription: endpoint address plus key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionHandle {
    /// Opaque transport address to deliver messages to.
    pub endpoint: String,
    /// Cryptographic keys issued alongside the endpoint.
    pub keys: SubscriptionKeys,
}

/// The message shape handed to the transport for one delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    /// Notification category string.
    #[serde(rename = "type")]
    pub kind: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Opaque key/value payload (sensitive fields already encrypted).
    pub data: serde_json::Value,
}

/// Errors the transport reports for a single delivery attempt.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network failure or timeout. The attempt may be retried.
    #[error("transient delivery failure: {0}")]
    Transient(String),
    /// The endpoint no longer exists. The subscription must be removed
    /// and the attempt must not be retried.
    #[error("push endpoint gone: {0}")]
    EndpointGone(String),
}

/// Trait for the external push transport.
///
/// Covers the platform permission prompt, subscription registration, and
/// the single send primitive. Implementations exist for the
/// function-invoke channel and an in-memory transport for tests and
/// single-node runs; both live in `pulso-delivery`.
///
/// Expected outcomes are values, not errors: a denied prompt and an
/// unavailable registration are reported through the return types, and
/// only unexpected faults surface as `AppError`.
#[async_trait]
pub trait PushGateway: Send + Sync + 'static {
    /// Current permission state, without prompting.
    async fn permission_state(&self) -> AppResult<PermissionState>;

    /// Prompt the user for permission and return the resulting state.
    async fn request_permission(&self) -> AppResult<PermissionState>;

    /// Register a push subscription. Returns `None` when registration is
    /// unavailable (unsupported platform, transport down).
    async fn register(&self) -> AppResult<Option<SubscriptionHandle>>;

    /// Remove the active registration. Idempotent: returns whether a
    /// registration existed.
    async fn unregister(&self) -> AppResult<bool>;

    /// Deliver one message to one user.
    async fn deliver(&self, user_id: UserId, message: &PushMessage) -> Result<(), TransportError>;
}
