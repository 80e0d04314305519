//! In-memory push gateway.
//!
//! Backs single-node deployments and tests. Permission state, prompt
//! outcome, registration availability, and per-call delivery outcomes
//! are all scriptable, and every delivered message is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use pulso_core::result::AppResult;
use pulso_core::traits::push::{
    PermissionState, PushGateway, PushMessage, SubscriptionHandle, SubscriptionKeys, TransportError,
};
use pulso_core::types::id::UserId;

/// Scriptable in-memory [`PushGateway`].
///
/// Fresh instances start with permission granted, registration
/// available, and every delivery succeeding.
pub struct MemoryGateway {
    permission: Mutex<PermissionState>,
    prompt_response: Mutex<PermissionState>,
    prompt_calls: AtomicU32,
    registration_available: AtomicBool,
    registered: Mutex<Option<SubscriptionHandle>>,
    outcomes: Mutex<VecDeque<Result<(), TransportError>>>,
    delivered: Mutex<Vec<(UserId, PushMessage)>>,
    deliver_calls: AtomicU32,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::with_permission(PermissionState::Granted)
    }

    /// Create a gateway starting from the given permission state.
    pub fn with_permission(permission: PermissionState) -> Self {
        Self {
            permission: Mutex::new(permission),
            prompt_response: Mutex::new(PermissionState::Granted),
            prompt_calls: AtomicU32::new(0),
            registration_available: AtomicBool::new(true),
            registered: Mutex::new(None),
            outcomes: Mutex::new(VecDeque::new()),
            delivered: Mutex::new(Vec::new()),
            deliver_calls: AtomicU32::new(0),
        }
    }

    pub fn set_permission(&self, state: PermissionState) {
        *self.lock_permission() = state;
    }

    /// What an undecided prompt resolves to.
    pub fn set_prompt_response(&self, state: PermissionState) {
        *self
            .prompt_response
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn set_registration_available(&self, available: bool) {
        self.registration_available
            .store(available, Ordering::SeqCst);
    }

    /// Queue outcomes for upcoming `deliver` calls, oldest first. Once
    /// the queue is drained, deliveries succeed.
    pub fn script_outcomes(&self, outcomes: Vec<Result<(), TransportError>>) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(outcomes);
    }

    /// Messages accepted so far, in delivery order.
    pub fn delivered(&self) -> Vec<(UserId, PushMessage)> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Total `deliver` calls, failed attempts included.
    pub fn deliver_calls(&self) -> u32 {
        self.deliver_calls.load(Ordering::SeqCst)
    }

    /// How many times the permission prompt was shown.
    pub fn prompt_calls(&self) -> u32 {
        self.prompt_calls.load(Ordering::SeqCst)
    }

    /// The currently registered handle, if any.
    pub fn registered(&self) -> Option<SubscriptionHandle> {
        self.registered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn lock_permission(&self) -> std::sync::MutexGuard<'_, PermissionState> {
        self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushGateway for MemoryGateway {
    async fn permission_state(&self) -> AppResult<PermissionState> {
        Ok(*self.lock_permission())
    }

    async fn request_permission(&self) -> AppResult<PermissionState> {
        self.prompt_calls.fetch_add(1, Ordering::SeqCst);
        let mut permission = self.lock_permission();
        if *permission == PermissionState::Prompt {
            *permission = *self
                .prompt_response
                .lock()
                .unwrap_or_else(|e| e.into_inner());
        }
        Ok(*permission)
    }

    async fn register(&self) -> AppResult<Option<SubscriptionHandle>> {
        if !self.registration_available.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let handle = SubscriptionHandle {
            endpoint: format!("https://push.gateway.local/{}", Uuid::new_v4()),
            keys: SubscriptionKeys {
                p256dh: Uuid::new_v4().simple().to_string(),
                auth: Uuid::new_v4().simple().to_string(),
            },
        };
        *self.registered.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle.clone());
        Ok(Some(handle))
    }

    async fn unregister(&self) -> AppResult<bool> {
        let removed = self
            .registered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some();
        Ok(removed)
    }

    async fn deliver(&self, user_id: UserId, message: &PushMessage) -> Result<(), TransportError> {
        self.deliver_calls.fetch_add(1, Ordering::SeqCst);

        let outcome = self
            .outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Ok(()));
        outcome?;

        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((user_id, message.clone()));
        Ok(())
    }
}
