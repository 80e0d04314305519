//! In-process fan-out for preference changes.
//!
//! Callers subscribe per user and receive the full [`Preferences`]
//! snapshot every time that user's preferences are written. Updates
//! carrying an `updated_at` older than one already delivered are
//! dropped; equal timestamps are delivered again, so listeners see
//! at-least-once semantics with per-user ordering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use pulso_core::types::id::{ListenerId, UserId};
use pulso_entity::Preferences;

type Listener = Arc<dyn Fn(&Preferences) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    listeners: RwLock<HashMap<UserId, HashMap<ListenerId, Listener>>>,
    /// Last delivered `updated_at` per user. The guard is held across
    /// the whole callback pass so updates for a user never interleave.
    delivered: Mutex<HashMap<UserId, DateTime<Utc>>>,
}

/// Synchronous preference change bus.
///
/// Callbacks run on the publishing thread while bus locks are held, so
/// they must be quick and must not call back into the bus.
#[derive(Clone, Default)]
pub struct PreferenceBus {
    inner: Arc<BusInner>,
}

impl PreferenceBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one user's preference changes.
    ///
    /// The returned guard unsubscribes when dropped.
    pub fn subscribe(
        &self,
        user_id: UserId,
        listener: impl Fn(&Preferences) + Send + Sync + 'static,
    ) -> PreferenceSubscription {
        let listener_id = ListenerId::new();
        {
            let mut listeners = self
                .inner
                .listeners
                .write()
                .unwrap_or_else(|e| e.into_inner());
            listeners
                .entry(user_id)
                .or_default()
                .insert(listener_id, Arc::new(listener));
        }
        debug!(%user_id, %listener_id, "Registered preference listener");

        PreferenceSubscription {
            inner: Arc::clone(&self.inner),
            user_id,
            listener_id,
            active: true,
        }
    }

    /// Deliver a preference snapshot to every listener for its user.
    ///
    /// Stale snapshots (strictly older `updated_at` than one already
    /// delivered for the user) are discarded.
    pub fn publish(&self, preferences: &Preferences) {
        let mut delivered = self
            .inner
            .delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(last) = delivered.get(&preferences.user_id) {
            if preferences.updated_at < *last {
                debug!(user_id = %preferences.user_id, "Dropped stale preference update");
                return;
            }
        }
        delivered.insert(preferences.user_id, preferences.updated_at);

        let listeners = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(for_user) = listeners.get(&preferences.user_id) {
            for listener in for_user.values() {
                listener(preferences);
            }
        }
    }

    /// Number of active listeners for a user.
    pub fn listener_count(&self, user_id: UserId) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .map_or(0, HashMap::len)
    }
}

/// Guard for one registered listener.
///
/// No callback starts after [`unsubscribe`](Self::unsubscribe) (or the
/// drop) returns; removal waits out any callback pass in flight.
pub struct PreferenceSubscription {
    inner: Arc<BusInner>,
    user_id: UserId,
    listener_id: ListenerId,
    active: bool,
}

impl PreferenceSubscription {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// Remove the listener now instead of at drop time.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(for_user) = listeners.get_mut(&self.user_id) {
            for_user.remove(&self.listener_id);
            if for_user.is_empty() {
                listeners.remove(&self.user_id);
            }
        }
        debug!(user_id = %self.user_id, listener_id = %self.listener_id, "Removed preference listener");
    }
}

impl Drop for PreferenceSubscription {
    fn drop(&mut self) {
        self.remove();
    }
}
