//! Per-user delivery preferences and the quiet-hours window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::types::id::UserId;
use pulso_core::types::time::TimeOfDay;

use crate::notification::NotificationType;

/// A daily do-not-disturb window.
///
/// The window is half-open: `[start, end)` in minutes since midnight.
/// When `start > end` the window wraps past midnight (22:00 to 08:00
/// covers the late evening and the early morning of the next day).
/// `start == end` is an empty window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    /// Whether the window is enforced at all.
    #[serde(default)]
    pub enabled: bool,
    /// Window start, local to the user's schedule.
    pub start: TimeOfDay,
    /// Window end (exclusive).
    pub end: TimeOfDay,
}

impl QuietHours {
    /// Whether the given minute-of-day falls inside the window.
    ///
    /// Ignores `enabled`; the caller decides whether the window applies.
    pub fn contains(&self, minute_of_day: u16) -> bool {
        let start = self.start.minutes_since_midnight();
        let end = self.end.minutes_since_midnight();
        if start > end {
            minute_of_day >= start || minute_of_day < end
        } else {
            minute_of_day >= start && minute_of_day < end
        }
    }
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: TimeOfDay::from_minutes(22 * 60),
            end: TimeOfDay::from_minutes(8 * 60),
        }
    }
}

/// Per-user notification delivery preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// The user these preferences belong to.
    pub user_id: UserId,
    /// Reminders and changes for upcoming appointments.
    #[serde(default = "default_true")]
    pub appointment_reminders: bool,
    /// Exercise program reminders and milestones.
    #[serde(default = "default_true")]
    pub exercise_reminders: bool,
    /// Treatment progress summaries.
    #[serde(default = "default_true")]
    pub progress_updates: bool,
    /// Direct messages from the therapist.
    #[serde(default = "default_true")]
    pub therapist_messages: bool,
    /// Outstanding payment reminders.
    #[serde(default = "default_true")]
    pub payment_reminders: bool,
    /// Platform-level alerts.
    #[serde(default = "default_true")]
    pub system_alerts: bool,
    /// Daily do-not-disturb window.
    #[serde(default)]
    pub quiet_hours: QuietHours,
    /// Whether to deliver on Saturdays and Sundays.
    #[serde(default = "default_true")]
    pub weekend_notifications: bool,
    /// When preferences were last updated (server-assigned).
    pub updated_at: DateTime<Utc>,
}

impl Preferences {
    /// Create default preferences for a user: every category enabled,
    /// quiet hours present but disabled.
    pub fn default_for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            appointment_reminders: true,
            exercise_reminders: true,
            progress_updates: true,
            therapist_messages: true,
            payment_reminders: true,
            system_alerts: true,
            quiet_hours: QuietHours::default(),
            weekend_notifications: true,
            updated_at: Utc::now(),
        }
    }

    /// Whether the per-category toggle allows this notification kind.
    pub fn allows_kind(&self, kind: NotificationType) -> bool {
        match kind {
            NotificationType::AppointmentReminder | NotificationType::AppointmentChange => {
                self.appointment_reminders
            }
            NotificationType::ExerciseReminder | NotificationType::ExerciseMilestone => {
                self.exercise_reminders
            }
            NotificationType::ProgressUpdate => self.progress_updates,
            NotificationType::TherapistMessage => self.therapist_messages,
            NotificationType::PaymentReminder => self.payment_reminders,
            NotificationType::SystemAlert => self.system_alerts,
        }
    }

    /// Merge a partial update into these preferences. Only fields the
    /// patch mentions change; `updated_at` is assigned by the caller.
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(v) = patch.appointment_reminders {
            self.appointment_reminders = v;
        }
        if let Some(v) = patch.exercise_reminders {
            self.exercise_reminders = v;
        }
        if let Some(v) = patch.progress_updates {
            self.progress_updates = v;
        }
        if let Some(v) = patch.therapist_messages {
            self.therapist_messages = v;
        }
        if let Some(v) = patch.payment_reminders {
            self.payment_reminders = v;
        }
        if let Some(v) = patch.system_alerts {
            self.system_alerts = v;
        }
        if let Some(v) = patch.quiet_hours {
            self.quiet_hours = v;
        }
        if let Some(v) = patch.weekend_notifications {
            self.weekend_notifications = v;
        }
    }
}

/// A partial preference update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub appointment_reminders: Option<bool>,
    pub exercise_reminders: Option<bool>,
    pub progress_updates: Option<bool>,
    pub therapist_messages: Option<bool>,
    pub payment_reminders: Option<bool>,
    pub system_alerts: Option<bool>,
    pub quiet_hours: Option<QuietHours>,
    pub weekend_notifications: Option<bool>,
}

fn default_true() -> bool {
    true
}
