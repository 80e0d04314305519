//! Integration tests for preference management and change fan-out.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use crate::helpers::{TestApp, draft};

use pulso::{
    NotificationStatus, NotificationType, PreferencesPatch, QuietHours, TimeOfDay,
};

fn quiet_evening() -> QuietHours {
    QuietHours {
        enabled: true,
        start: TimeOfDay::from_minutes(22 * 60),
        end: TimeOfDay::from_minutes(8 * 60),
    }
}

#[tokio::test]
async fn test_first_access_creates_defaults() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let preferences = app.services.preferences.get_preferences(user).await.unwrap();

    assert!(preferences.appointment_reminders);
    assert!(preferences.exercise_reminders);
    assert!(preferences.weekend_notifications);
    assert!(!preferences.quiet_hours.enabled);
}

#[tokio::test]
async fn test_partial_update_preserves_other_fields() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let updated = app
        .services
        .preferences
        .update_preferences(
            user,
            PreferencesPatch {
                exercise_reminders: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!updated.exercise_reminders);
    assert!(updated.appointment_reminders);
    assert!(updated.therapist_messages);

    let reread = app.services.preferences.get_preferences(user).await.unwrap();
    assert!(!reread.exercise_reminders);
}

#[tokio::test]
async fn test_updates_notify_subscribers() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let subscription = app
        .services
        .preferences
        .subscribe_to_changes(user, move |preferences| {
            sink.lock().unwrap().push(preferences.clone());
        });

    app.services
        .preferences
        .update_preferences(
            user,
            PreferencesPatch {
                payment_reminders: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    {
        let seen = received.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].payment_reminders);
    }

    // After unsubscribing no further snapshots arrive.
    subscription.unsubscribe();
    app.services
        .preferences
        .update_preferences(
            user,
            PreferencesPatch {
                payment_reminders: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_disabled_category_suppresses_the_send() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.services
        .preferences
        .update_preferences(
            user,
            PreferencesPatch {
                exercise_reminders: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::ExerciseReminder))
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.status, NotificationStatus::Suppressed);
    assert!(app.gateway.delivered().is_empty());

    // Other categories still go out.
    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::TherapistMessage))
        .await
        .unwrap();
    assert!(report.success);
}

#[tokio::test]
async fn test_quiet_hours_gate_by_wall_clock() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.services
        .preferences
        .update_preferences(
            user,
            PreferencesPatch {
                quiet_hours: Some(quiet_evening()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let monday_night = Utc.with_ymd_and_hms(2025, 6, 16, 23, 30, 0).unwrap();
    let monday_noon = Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap();

    assert!(
        !app.services
            .engine
            .should_send(user, NotificationType::ExerciseReminder, monday_night)
            .await
            .unwrap()
    );
    assert!(
        app.services
            .engine
            .should_send(user, NotificationType::ExerciseReminder, monday_noon)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_weekend_toggle_gates_saturday_sends() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.services
        .preferences
        .update_preferences(
            user,
            PreferencesPatch {
                weekend_notifications: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let saturday = Utc.with_ymd_and_hms(2025, 6, 14, 10, 0, 0).unwrap();
    let monday = Utc.with_ymd_and_hms(2025, 6, 16, 10, 0, 0).unwrap();

    assert!(
        !app.services
            .engine
            .should_send(user, NotificationType::ProgressUpdate, saturday)
            .await
            .unwrap()
    );
    assert!(
        app.services
            .engine
            .should_send(user, NotificationType::ProgressUpdate, monday)
            .await
            .unwrap()
    );
}
