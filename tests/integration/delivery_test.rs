//! Integration tests for the delivery path.

use crate::helpers::{TestApp, draft};

use pulso::{
    ErrorKind, NotificationDraft, NotificationStatus, NotificationType, PermissionState,
    TransportError, UserId,
};

#[tokio::test]
async fn test_send_delivers_and_records_history() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::TherapistMessage))
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.status, NotificationStatus::Sent);
    assert_eq!(report.attempts, 1);

    let delivered = app.gateway.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, user);
    assert_eq!(delivered[0].1.kind, "therapist_message");

    let history = app.services.notifications.find_by_user(user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, report.notification_id);
    assert_eq!(history[0].status, NotificationStatus::Sent);
    assert!(history[0].sent_at.is_some());
}

#[tokio::test]
async fn test_send_without_consent_is_blocked() {
    let app = TestApp::new();
    let user = UserId::new();

    let err = app
        .services
        .engine
        .send(user, draft(NotificationType::ExerciseReminder))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ConsentMissing);
    assert!(app.gateway.delivered().is_empty());
    assert!(app.services.notifications.find_by_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_content_with_personal_identifiers_is_rejected() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let draft = NotificationDraft::new(
        NotificationType::AppointmentReminder,
        "Appointment for 123.456.789-00",
        "See you tomorrow.",
    );
    let report = app.services.engine.send(user, draft).await.unwrap();

    assert!(!report.success);
    assert_eq!(report.status, NotificationStatus::Failed);
    assert_eq!(report.attempts, 0);
    assert!(app.gateway.delivered().is_empty());

    let history = app.services.notifications.find_by_user(user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_retry_until_success() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.gateway.script_outcomes(vec![
        Err(TransportError::Transient("timeout".to_string())),
        Err(TransportError::Transient("timeout".to_string())),
        Ok(()),
    ]);

    let report = app
        .services
        .engine
        .send_with_retry(
            user,
            draft(NotificationType::AppointmentReminder),
            app.services.engine.retry_policy(),
        )
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.status, NotificationStatus::Sent);
    assert_eq!(report.attempts, 3);
    assert_eq!(app.gateway.deliver_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_leave_a_failed_row() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.gateway.script_outcomes(vec![
        Err(TransportError::Transient("timeout".to_string())),
        Err(TransportError::Transient("timeout".to_string())),
        Err(TransportError::Transient("timeout".to_string())),
    ]);

    let report = app
        .services
        .engine
        .send_with_retry(
            user,
            draft(NotificationType::PaymentReminder),
            app.services.engine.retry_policy(),
        )
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.status, NotificationStatus::Failed);
    assert_eq!(report.attempts, 3);

    let history = app.services.notifications.find_by_user(user).await.unwrap();
    assert_eq!(history[0].retry_count, 3);
    assert!(history[0].last_error.as_deref().unwrap().contains("timeout"));
}

#[tokio::test]
async fn test_endpoint_gone_removes_the_subscription() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.services
        .engine
        .subscribe(user, "integration-tests")
        .await
        .unwrap()
        .expect("Subscription should be created");
    assert_eq!(
        app.services.subscriptions.find_by_user(user).await.unwrap().len(),
        1
    );

    app.gateway
        .script_outcomes(vec![Err(TransportError::EndpointGone("410".to_string()))]);
    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::SystemAlert))
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.status, NotificationStatus::Failed);
    assert!(
        app.services.subscriptions.find_by_user(user).await.unwrap().is_empty()
    );
}

#[tokio::test]
async fn test_permission_prompt_is_honored_once() {
    let app = TestApp::new();
    app.gateway.set_permission(PermissionState::Prompt);
    app.gateway.set_prompt_response(PermissionState::Granted);

    assert!(app.services.engine.request_permission().await.unwrap());
    assert_eq!(app.gateway.prompt_calls(), 1);

    // Granted now sticks; no further prompt.
    assert!(app.services.engine.request_permission().await.unwrap());
    assert_eq!(app.gateway.prompt_calls(), 1);
}

#[tokio::test]
async fn test_subscribe_requires_granted_permission() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.gateway.set_permission(PermissionState::Denied);

    let subscription = app
        .services
        .engine
        .subscribe(user, "integration-tests")
        .await
        .unwrap();

    assert!(subscription.is_none());
    assert!(
        app.services.subscriptions.find_by_user(user).await.unwrap().is_empty()
    );
}
