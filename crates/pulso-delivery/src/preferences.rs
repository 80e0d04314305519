//! Preference reads, writes, and change fan-out.

use chrono::Utc;
use tracing::info;

use pulso_core::result::AppResult;
use pulso_core::types::id::UserId;
use pulso_entity::{Preferences, PreferencesPatch};
use pulso_store::PreferenceRepository;

use crate::bus::{PreferenceBus, PreferenceSubscription};

/// Read and write access to per-user notification preferences.
///
/// The first read for a user persists the default row, so later reads
/// and updates always operate on stored state. Every successful write
/// stamps `updated_at` and fans the new snapshot out on the bus.
#[derive(Clone)]
pub struct PreferenceService {
    preferences: PreferenceRepository,
    bus: PreferenceBus,
}

impl PreferenceService {
    pub fn new(preferences: PreferenceRepository, bus: PreferenceBus) -> Self {
        Self { preferences, bus }
    }

    /// Current preferences for a user, creating the defaults on first
    /// access.
    pub async fn get_preferences(&self, user_id: UserId) -> AppResult<Preferences> {
        if let Some(preferences) = self.preferences.get(user_id).await? {
            return Ok(preferences);
        }

        let defaults = Preferences::default_for_user(user_id);
        self.preferences.upsert(&defaults).await?;
        info!(%user_id, "Created default notification preferences");
        Ok(defaults)
    }

    /// Apply a partial update and broadcast the resulting snapshot.
    ///
    /// Fields absent from the patch keep their stored values. The
    /// write stamps `updated_at`, so concurrent updates resolve
    /// last-write-wins.
    pub async fn update_preferences(
        &self,
        user_id: UserId,
        patch: PreferencesPatch,
    ) -> AppResult<Preferences> {
        let mut preferences = self.get_preferences(user_id).await?;
        preferences.apply(patch);
        preferences.updated_at = Utc::now();

        self.preferences.upsert(&preferences).await?;
        self.bus.publish(&preferences);
        info!(%user_id, "Updated notification preferences");
        Ok(preferences)
    }

    /// Listen for one user's preference changes.
    pub fn subscribe_to_changes(
        &self,
        user_id: UserId,
        listener: impl Fn(&Preferences) + Send + Sync + 'static,
    ) -> PreferenceSubscription {
        self.bus.subscribe(user_id, listener)
    }

    /// The underlying change bus.
    pub fn bus(&self) -> &PreferenceBus {
        &self.bus
    }
}
