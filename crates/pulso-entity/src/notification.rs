//! Notification entity and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::types::id::{NotificationId, UserId};

/// Notification categories recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Upcoming appointment reminder.
    AppointmentReminder,
    /// An appointment was rescheduled or cancelled.
    AppointmentChange,
    /// Daily exercise program reminder.
    ExerciseReminder,
    /// An exercise milestone was reached.
    ExerciseMilestone,
    /// Treatment progress summary.
    ProgressUpdate,
    /// Direct message from the therapist.
    TherapistMessage,
    /// Outstanding payment reminder.
    PaymentReminder,
    /// Platform-level alert.
    SystemAlert,
}

impl NotificationType {
    /// All categories, in declaration order.
    pub const ALL: [NotificationType; 8] = [
        Self::AppointmentReminder,
        Self::AppointmentChange,
        Self::ExerciseReminder,
        Self::ExerciseMilestone,
        Self::ProgressUpdate,
        Self::TherapistMessage,
        Self::PaymentReminder,
        Self::SystemAlert,
    ];

    /// Parse from the stored string form.
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "appointment_reminder" => Some(Self::AppointmentReminder),
            "appointment_change" => Some(Self::AppointmentChange),
            "exercise_reminder" => Some(Self::ExerciseReminder),
            "exercise_milestone" => Some(Self::ExerciseMilestone),
            "progress_update" => Some(Self::ProgressUpdate),
            "therapist_message" => Some(Self::TherapistMessage),
            "payment_reminder" => Some(Self::PaymentReminder),
            "system_alert" => Some(Self::SystemAlert),
            _ => None,
        }
    }

    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppointmentReminder => "appointment_reminder",
            Self::AppointmentChange => "appointment_change",
            Self::ExerciseReminder => "exercise_reminder",
            Self::ExerciseMilestone => "exercise_milestone",
            Self::ProgressUpdate => "progress_update",
            Self::TherapistMessage => "therapist_message",
            Self::PaymentReminder => "payment_reminder",
            Self::SystemAlert => "system_alert",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a notification.
///
/// Transitions: `Pending → {Suppressed | Sent | Failed}`,
/// `Sent → {Delivered | Failed}`, `Delivered → Clicked`, and
/// `Failed → Pending` while retries remain. `Suppressed` and `Clicked`
/// accept no further transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Created, not yet attempted.
    Pending,
    /// Accepted by the push transport.
    Sent,
    /// Confirmed shown on the device.
    Delivered,
    /// Opened by the user.
    Clicked,
    /// The attempt failed (terminal once retries are exhausted).
    Failed,
    /// Dropped by quiet hours or preference checks.
    Suppressed,
}

impl NotificationStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Sent)
                | (Self::Pending, Self::Suppressed)
                | (Self::Pending, Self::Failed)
                | (Self::Sent, Self::Delivered)
                | (Self::Sent, Self::Failed)
                | (Self::Delivered, Self::Clicked)
                | (Self::Failed, Self::Pending)
        )
    }

    /// Whether this status counts as accepted by the transport.
    pub fn was_sent(self) -> bool {
        matches!(self, Self::Sent | Self::Delivered | Self::Clicked)
    }

    /// Whether this status counts as shown on the device.
    pub fn was_delivered(self) -> bool {
        matches!(self, Self::Delivered | Self::Clicked)
    }
}

/// The caller-supplied content of a send request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// Notification category.
    pub kind: NotificationType,
    /// Title shown on the device.
    pub title: String,
    /// Body text shown on the device.
    pub body: String,
    /// Opaque key/value payload forwarded to the client.
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

impl NotificationDraft {
    /// Create a draft with an empty payload.
    pub fn new(kind: NotificationType, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            data: empty_object(),
        }
    }

    /// Attach a payload object.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// One message attempt, persisted to `notification_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Notification category.
    pub kind: NotificationType,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Opaque key/value payload (sensitive fields encrypted before send).
    pub data: serde_json::Value,
    /// Current lifecycle status.
    pub status: NotificationStatus,
    /// When the transport accepted the message.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the device confirmed display.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the user opened the notification.
    pub clicked_at: Option<DateTime<Utc>>,
    /// Number of failed transport attempts so far.
    pub retry_count: u32,
    /// Most recent failure reason.
    pub last_error: Option<String>,
    /// When the send was requested.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a pending notification from a draft.
    pub fn from_draft(user_id: UserId, draft: NotificationDraft) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            kind: draft.kind,
            title: draft.title,
            body: draft.body,
            data: draft.data,
            status: NotificationStatus::Pending,
            sent_at: None,
            delivered_at: None,
            clicked_at: None,
            retry_count: 0,
            last_error: None,
            created_at: Utc::now(),
        }
    }

    /// Record transport acceptance.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.status = NotificationStatus::Sent;
        self.sent_at = Some(at);
        self.last_error = None;
    }

    /// Record a failed attempt with its reason.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = NotificationStatus::Failed;
        self.retry_count += 1;
        self.last_error = Some(error.into());
    }

    /// Record rejection before any transport attempt, e.g. by the
    /// content scanner. Does not count as a failed attempt.
    pub fn mark_rejected(&mut self, reason: impl Into<String>) {
        self.status = NotificationStatus::Failed;
        self.last_error = Some(reason.into());
    }

    /// Record suppression by preferences or quiet hours.
    pub fn mark_suppressed(&mut self, reason: impl Into<String>) {
        self.status = NotificationStatus::Suppressed;
        self.last_error = Some(reason.into());
    }

    /// Record confirmed display. A click implies display, so the
    /// delivered timestamp is only set once.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) {
        self.status = NotificationStatus::Delivered;
        if self.delivered_at.is_none() {
            self.delivered_at = Some(at);
        }
    }

    /// Record the user opening the notification.
    pub fn mark_clicked(&mut self, at: DateTime<Utc>) {
        if self.delivered_at.is_none() {
            self.delivered_at = Some(at);
        }
        self.status = NotificationStatus::Clicked;
        self.clicked_at = Some(at);
    }

    /// Reset a failed notification for another attempt.
    pub fn reset_for_retry(&mut self) {
        self.status = NotificationStatus::Pending;
    }

    /// The timestamp analytics windows bucket this row by: the send
    /// time when the transport accepted it, otherwise creation time.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.sent_at.unwrap_or(self.created_at)
    }

    /// Whether the row represents a transport attempt (anything past
    /// preference screening).
    pub fn was_attempted(&self) -> bool {
        self.status.was_sent() || self.status == NotificationStatus::Failed
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_matrix() {
        use NotificationStatus::*;
        assert!(Pending.can_transition(Sent));
        assert!(Pending.can_transition(Suppressed));
        assert!(Pending.can_transition(Failed));
        assert!(Sent.can_transition(Delivered));
        assert!(Sent.can_transition(Failed));
        assert!(Delivered.can_transition(Clicked));
        assert!(Failed.can_transition(Pending));

        assert!(!Suppressed.can_transition(Pending));
        assert!(!Suppressed.can_transition(Sent));
        assert!(!Clicked.can_transition(Delivered));
        assert!(!Sent.can_transition(Pending));
        assert!(!Pending.can_transition(Delivered));
    }

    #[test]
    fn test_click_backfills_delivery() {
        let draft = NotificationDraft::new(NotificationType::TherapistMessage, "t", "b");
        let mut n = Notification::from_draft(UserId::new(), draft);
        let now = Utc::now();
        n.mark_sent(now);
        n.mark_clicked(now);
        assert_eq!(n.status, NotificationStatus::Clicked);
        assert_eq!(n.delivered_at, Some(now));
        assert_eq!(n.clicked_at, Some(now));
    }

    #[test]
    fn test_failed_attempt_counts_retries() {
        let draft = NotificationDraft::new(NotificationType::AppointmentReminder, "t", "b");
        let mut n = Notification::from_draft(UserId::new(), draft);
        n.mark_failed("timeout");
        n.reset_for_retry();
        n.mark_failed("timeout");
        assert_eq!(n.retry_count, 2);
        assert_eq!(n.last_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_type_string_roundtrip() {
        for kind in [
            NotificationType::AppointmentReminder,
            NotificationType::ExerciseMilestone,
            NotificationType::SystemAlert,
        ] {
            assert_eq!(NotificationType::from_str_value(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationType::from_str_value("unknown"), None);
    }
}
