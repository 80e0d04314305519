//! Logical table names. The schema behind each name is the contract
//! shared with external collaborators; renaming one is a breaking change.

/// Notification rows, one per message attempt.
pub const NOTIFICATION_HISTORY: &str = "notification_history";

/// Active push endpoints, one per device per user.
pub const PUSH_SUBSCRIPTIONS: &str = "push_subscriptions";

/// One preference row per user.
pub const NOTIFICATION_PREFERENCES: &str = "notification_preferences";

/// Append-only consent ledger entries.
pub const NOTIFICATION_CONSENT: &str = "notification_consent";

/// Raw click/dismiss events with metadata.
pub const NOTIFICATION_INTERACTIONS: &str = "notification_interactions";
