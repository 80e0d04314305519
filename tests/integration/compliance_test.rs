//! Integration tests for consent, payload encryption, and privacy tooling.

use serde_json::json;

use crate::helpers::{TestApp, draft};

use pulso::{
    ConsentInput, ErrorKind, InteractionKind, NotificationDraft, NotificationType, PayloadCipher,
};

#[tokio::test]
async fn test_consent_revocation_blocks_further_sends() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::AppointmentReminder))
        .await
        .unwrap();
    assert!(report.success);

    // A newer ledger entry withdraws delivery consent.
    app.services
        .consent
        .record_consent(ConsentInput {
            user_id: user,
            notifications_enabled: false,
            data_processing_consent: true,
            analytics_consent: true,
            marketing_consent: false,
            origin_address: "203.0.113.10".to_string(),
            user_agent: "integration-tests".to_string(),
        })
        .await
        .unwrap();

    let err = app
        .services
        .engine
        .send(user, draft(NotificationType::AppointmentReminder))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConsentMissing);
    assert_eq!(app.gateway.delivered().len(), 1);
}

#[tokio::test]
async fn test_sensitive_payload_fields_are_sealed_before_storage_and_transport() {
    let app = TestApp::new();
    let user = app.consenting_user().await;

    let draft = NotificationDraft::new(
        NotificationType::AppointmentChange,
        "Schedule change",
        "Your appointment moved to Friday.",
    )
    .with_data(json!({"cpf": "52998224725", "room": "B2"}));

    let report = app.services.engine.send(user, draft).await.unwrap();
    assert!(report.success);

    let history = app.services.notifications.find_by_user(user).await.unwrap();
    let stored = &history[0].data;
    let sealed = stored["cpf"].as_str().unwrap();
    assert_ne!(sealed, "52998224725");
    assert_eq!(stored["room"], "B2");

    // The transport saw the same sealed form, never the plaintext.
    let delivered = app.gateway.delivered();
    assert_eq!(delivered[0].1.data["cpf"].as_str().unwrap(), sealed);

    let cipher = PayloadCipher::new(&app.services.config.compliance).unwrap();
    assert_eq!(cipher.decrypt_field(sealed).unwrap(), "52998224725");
}

#[tokio::test]
async fn test_export_aggregates_every_table() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.services
        .engine
        .subscribe(user, "integration-tests")
        .await
        .unwrap();
    app.services
        .preferences
        .get_preferences(user)
        .await
        .unwrap();
    let report = app
        .services
        .engine
        .send(user, draft(NotificationType::ProgressUpdate))
        .await
        .unwrap();
    app.services
        .analytics
        .track_interaction(report.notification_id, user, InteractionKind::Clicked, json!({}))
        .await
        .unwrap();

    let export = app.services.privacy.export_user_data(user).await.unwrap();

    assert_eq!(export.subscriptions.len(), 1);
    assert!(export.preferences.is_some());
    assert_eq!(export.history.len(), 1);
    assert_eq!(export.consent.len(), 1);
}

#[tokio::test]
async fn test_erasure_removes_every_record() {
    let app = TestApp::new();
    let user = app.consenting_user().await;
    app.services
        .engine
        .subscribe(user, "integration-tests")
        .await
        .unwrap();
    app.services
        .preferences
        .get_preferences(user)
        .await
        .unwrap();
    app.services
        .engine
        .send(user, draft(NotificationType::ProgressUpdate))
        .await
        .unwrap();

    app.services.privacy.delete_user_data(user).await.unwrap();

    let export = app.services.privacy.export_user_data(user).await.unwrap();
    assert!(export.subscriptions.is_empty());
    assert!(export.preferences.is_none());
    assert!(export.history.is_empty());
    assert!(export.consent.is_empty());

    // With the ledger gone, the consent gate closes again.
    let err = app
        .services
        .engine
        .send(user, draft(NotificationType::ProgressUpdate))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConsentMissing);
}
