//! Raw notification interaction events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::types::id::{InteractionId, NotificationId, UserId};

use crate::notification::NotificationStatus;

/// What the user did with a delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// The device confirmed display.
    Delivered,
    /// The user opened the notification.
    Clicked,
    /// The user dismissed it without opening.
    Dismissed,
}

impl InteractionKind {
    /// The notification status this interaction settles the row at.
    /// A dismissal still proves the notification was shown.
    pub fn settles_at(&self) -> NotificationStatus {
        match self {
            Self::Clicked => NotificationStatus::Clicked,
            Self::Delivered | Self::Dismissed => NotificationStatus::Delivered,
        }
    }
}

/// One raw interaction row, kept for analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Unique event identifier.
    pub id: InteractionId,
    /// The notification interacted with.
    pub notification_id: NotificationId,
    /// The interacting user.
    pub user_id: UserId,
    /// What happened.
    pub kind: InteractionKind,
    /// Free-form context (device, screen, campaign tag).
    pub metadata: serde_json::Value,
    /// When the interaction occurred.
    pub occurred_at: DateTime<Utc>,
}

impl InteractionEvent {
    /// Record an interaction happening now.
    pub fn new(
        notification_id: NotificationId,
        user_id: UserId,
        kind: InteractionKind,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: InteractionId::new(),
            notification_id,
            user_id,
            kind,
            metadata,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_statuses() {
        assert_eq!(
            InteractionKind::Clicked.settles_at(),
            NotificationStatus::Clicked
        );
        assert_eq!(
            InteractionKind::Dismissed.settles_at(),
            NotificationStatus::Delivered
        );
        assert_eq!(
            InteractionKind::Delivered.settles_at(),
            NotificationStatus::Delivered
        );
    }
}
