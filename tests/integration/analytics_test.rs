//! Integration tests for engagement analytics over the live send path.

use chrono::{Duration, Timelike, Utc};
use serde_json::json;

use crate::helpers::{TestApp, draft};

use pulso::{InteractionKind, NotificationStatus, NotificationType};

#[tokio::test]
async fn test_send_track_report_pipeline() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::ExerciseReminder))
        .await
        .unwrap();
    app.services
        .analytics
        .track_interaction(
            report.notification_id,
            user,
            InteractionKind::Clicked,
            json!({"screen": "exercises"}),
        )
        .await
        .unwrap();

    let end = Utc::now() + Duration::minutes(1);
    let start = end - Duration::days(1);
    let performance = app
        .services
        .analytics
        .performance_report(start, end)
        .await
        .unwrap();

    assert_eq!(performance.overview.total_sent, 1);
    assert_eq!(performance.overview.total_delivered, 1);
    assert_eq!(performance.overview.total_clicked, 1);
    assert_eq!(performance.overview.delivery_rate, 100.0);
    assert_eq!(performance.top_engaged_users.len(), 1);
    assert_eq!(performance.top_engaged_users[0].user_id, user);
    assert!(!performance.recommendations.is_empty());

    let row = performance
        .by_type
        .iter()
        .find(|p| p.kind == NotificationType::ExerciseReminder)
        .unwrap();
    assert_eq!(row.total_sent, 1);
    assert_eq!(row.total_clicked, 1);

    let history = app.services.notifications.find_by_user(user).await.unwrap();
    assert_eq!(history[0].status, NotificationStatus::Clicked);
}

#[tokio::test]
async fn test_csv_export_reflects_live_history() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::AppointmentReminder))
        .await
        .unwrap();
    app.services
        .analytics
        .track_interaction(report.notification_id, user, InteractionKind::Clicked, json!({}))
        .await
        .unwrap();

    let end = Utc::now() + Duration::minutes(1);
    let csv = app
        .services
        .analytics
        .export_csv(end - Duration::days(1), end, true)
        .await
        .unwrap();

    assert!(csv.starts_with(
        "Type,Total Sent,Total Delivered,Total Clicked,Total Failed,Delivery Rate,Click Rate\n"
    ));
    assert!(csv.contains("appointment_reminder,1,1,1,0,100.00%,100.00%"));
    assert!(csv.contains(&format!("{user},1,1,100.00%")));
}

#[tokio::test]
async fn test_send_time_advisor_follows_click_history() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::ExerciseReminder))
        .await
        .unwrap();
    app.services
        .analytics
        .track_interaction(report.notification_id, user, InteractionKind::Clicked, json!({}))
        .await
        .unwrap();

    let history = app.services.notifications.find_by_user(user).await.unwrap();
    let clicked_hour = history[0].clicked_at.unwrap().hour();

    let now = Utc::now();
    let advised = app
        .services
        .send_time
        .get_optimal_send_time(user, now)
        .await
        .unwrap();

    assert!(advised > now);
    assert_eq!(advised.hour(), clicked_hour);
    assert_eq!(advised.minute(), 0);
}
