//! The delivery engine.
//!
//! Owns the full path of one send: consent gate, content scan,
//! preference and quiet-hours screening, payload encryption, history
//! persistence, and retried transport dispatch. Also manages the
//! permission and subscription lifecycle against the push gateway.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pulso_compliance::{ConsentLedger, ContentValidator, PayloadCipher};
use pulso_core::result::AppResult;
use pulso_core::traits::push::{PermissionState, PushGateway, PushMessage, TransportError};
use pulso_core::types::id::{NotificationId, UserId};
use pulso_entity::{
    Notification, NotificationDraft, NotificationStatus, NotificationType, Preferences,
    PushSubscription,
};
use pulso_store::{NotificationRepository, SubscriptionRepository};

use crate::preferences::PreferenceService;
use crate::retry::RetryPolicy;

/// Outcome of the per-send preference screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendDecision {
    /// All checks passed.
    Allow,
    /// The user disabled this notification category.
    CategoryDisabled,
    /// The send falls inside the user's quiet hours.
    QuietHours,
    /// Weekend delivery is off and the send falls on a weekend.
    Weekend,
}

impl SendDecision {
    /// Whether the send may proceed.
    pub fn allows(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Reason recorded on the suppressed history row, `None` when the
    /// send is allowed.
    pub fn suppression_reason(self, kind: NotificationType) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::CategoryDisabled => {
                Some(format!("Category {kind} disabled by user preferences"))
            }
            Self::QuietHours => Some("Suppressed by quiet hours".to_string()),
            Self::Weekend => Some("Weekend notifications disabled".to_string()),
        }
    }
}

/// Screen a send against preferences without touching storage.
///
/// Checks run in a fixed order: category toggle, quiet hours, weekend.
/// The first failing check decides the outcome.
pub fn evaluate_send(
    preferences: &Preferences,
    kind: NotificationType,
    at: DateTime<Utc>,
) -> SendDecision {
    if !preferences.allows_kind(kind) {
        return SendDecision::CategoryDisabled;
    }
    if preferences.quiet_hours.enabled && preferences.quiet_hours.contains(minute_of_day(at)) {
        return SendDecision::QuietHours;
    }
    if !preferences.weekend_notifications && is_weekend(at) {
        return SendDecision::Weekend;
    }
    SendDecision::Allow
}

/// Next instant delivery would be allowed once quiet hours end.
///
/// Returns `from` unchanged when quiet hours do not block it. Inside a
/// window wrapping midnight, an evening timestamp resolves to the next
/// day's window end.
pub fn next_allowed_time(preferences: &Preferences, from: DateTime<Utc>) -> DateTime<Utc> {
    let quiet = &preferences.quiet_hours;
    if !quiet.enabled || !quiet.contains(minute_of_day(from)) {
        return from;
    }

    let day_start = from.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
    let mut next =
        day_start + chrono::Duration::minutes(i64::from(quiet.end.minutes_since_midnight()));
    if next <= from {
        next += chrono::Duration::days(1);
    }
    next
}

fn minute_of_day(at: DateTime<Utc>) -> u16 {
    (at.hour() * 60 + at.minute()) as u16
}

fn is_weekend(at: DateTime<Utc>) -> bool {
    matches!(at.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Outcome of one send request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReport {
    /// The persisted history row.
    pub notification_id: NotificationId,
    /// Whether the transport accepted the message.
    pub success: bool,
    /// Final status of the history row.
    pub status: NotificationStatus,
    /// Transport attempts made; zero when blocked before the transport.
    pub attempts: u32,
    /// Rejection, suppression, or final transport failure reason.
    pub error: Option<String>,
}

/// Push delivery engine.
#[derive(Clone)]
pub struct DeliveryEngine {
    gateway: Arc<dyn PushGateway>,
    notifications: NotificationRepository,
    subscriptions: SubscriptionRepository,
    preferences: PreferenceService,
    consent: ConsentLedger,
    validator: ContentValidator,
    cipher: PayloadCipher,
    retry: RetryPolicy,
}

impl DeliveryEngine {
    pub fn new(
        gateway: Arc<dyn PushGateway>,
        notifications: NotificationRepository,
        subscriptions: SubscriptionRepository,
        preferences: PreferenceService,
        consent: ConsentLedger,
        cipher: PayloadCipher,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            gateway,
            notifications,
            subscriptions,
            preferences,
            consent,
            validator: ContentValidator::new(),
            cipher,
            retry,
        }
    }

    /// The configured default retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolve notification permission, prompting only when undecided.
    ///
    /// A previous denial resolves to `false` without prompting again.
    pub async fn request_permission(&self) -> AppResult<bool> {
        match self.gateway.permission_state().await? {
            PermissionState::Granted => Ok(true),
            PermissionState::Denied => {
                debug!("Notification permission previously denied, not prompting");
                Ok(false)
            }
            PermissionState::Prompt => {
                let resolved = self.gateway.request_permission().await?;
                info!(?resolved, "Notification permission prompt resolved");
                Ok(resolved == PermissionState::Granted)
            }
        }
    }

    /// Register the device for push delivery and persist the
    /// subscription row.
    ///
    /// Returns `Ok(None)` without error when permission is not granted
    /// or the transport cannot register.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        user_agent: &str,
    ) -> AppResult<Option<PushSubscription>> {
        if self.gateway.permission_state().await? != PermissionState::Granted {
            debug!(%user_id, "Subscribe skipped, permission not granted");
            return Ok(None);
        }

        let Some(handle) = self.gateway.register().await? else {
            warn!(%user_id, "Push registration unavailable");
            return Ok(None);
        };

        let subscription = PushSubscription::from_handle(user_id, handle, user_agent.to_string());
        self.subscriptions.save(&subscription).await?;
        info!(%user_id, subscription_id = %subscription.id, "Push subscription registered");
        Ok(Some(subscription))
    }

    /// Drop the transport registration and the stored subscription
    /// rows. Succeeds whether or not a subscription existed.
    pub async fn unsubscribe(&self, user_id: UserId) -> AppResult<bool> {
        self.gateway.unregister().await?;
        let removed = self.subscriptions.delete_for_user(user_id).await?;
        info!(%user_id, removed, "Push subscription removed");
        Ok(true)
    }

    /// Whether a notification of this kind may be sent to the user at
    /// the given instant, per their stored preferences.
    pub async fn should_send(
        &self,
        user_id: UserId,
        kind: NotificationType,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let preferences = self.preferences.get_preferences(user_id).await?;
        Ok(evaluate_send(&preferences, kind, at).allows())
    }

    /// Send one notification with a single transport attempt.
    pub async fn send(&self, user_id: UserId, draft: NotificationDraft) -> AppResult<SendReport> {
        self.dispatch(user_id, draft, &RetryPolicy::no_retry()).await
    }

    /// Send one notification, retrying transient transport failures
    /// per the policy.
    pub async fn send_with_retry(
        &self,
        user_id: UserId,
        draft: NotificationDraft,
        policy: &RetryPolicy,
    ) -> AppResult<SendReport> {
        self.dispatch(user_id, draft, policy).await
    }

    async fn dispatch(
        &self,
        user_id: UserId,
        draft: NotificationDraft,
        policy: &RetryPolicy,
    ) -> AppResult<SendReport> {
        // Consent gates the whole pipeline; nothing is persisted for a
        // user without a permitting ledger entry.
        self.consent.ensure_allowed(user_id).await?;

        let mut notification = Notification::from_draft(user_id, draft);

        // The content scan runs on plaintext, before payload encryption.
        let scan = self.validator.validate(&notification.title, &notification.body);
        if !scan.is_valid {
            let reason = scan.violations.join("; ");
            notification.mark_rejected(&reason);
            self.notifications.save(&notification).await?;
            warn!(%user_id, notification_id = %notification.id, %reason, "Notification rejected by content scan");
            return Ok(self.report(&notification, false, 0, Some(reason)));
        }

        let preferences = self.preferences.get_preferences(user_id).await?;
        let now = Utc::now();
        let decision = evaluate_send(&preferences, notification.kind, now);
        if let Some(reason) = decision.suppression_reason(notification.kind) {
            notification.mark_suppressed(&reason);
            self.notifications.save(&notification).await?;
            if decision == SendDecision::QuietHours {
                debug!(
                    %user_id,
                    next_allowed = %next_allowed_time(&preferences, now),
                    "Notification suppressed by quiet hours"
                );
            } else {
                debug!(%user_id, %reason, "Notification suppressed");
            }
            return Ok(self.report(&notification, false, 0, Some(reason)));
        }

        notification.data = self.cipher.encrypt_payload(notification.data.take())?;
        self.notifications.save(&notification).await?;

        let message = PushMessage {
            kind: notification.kind.as_str().to_string(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: notification.data.clone(),
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.gateway.deliver(user_id, &message).await {
                Ok(()) => {
                    notification.mark_sent(Utc::now());
                    self.notifications.save(&notification).await?;
                    info!(%user_id, notification_id = %notification.id, attempts, "Notification sent");
                    return Ok(self.report(&notification, true, attempts, None));
                }
                Err(TransportError::EndpointGone(reason)) => {
                    notification.mark_failed(&reason);
                    self.notifications.save(&notification).await?;
                    warn!(%user_id, %reason, "Push endpoint gone, removing subscription");
                    self.unsubscribe(user_id).await?;
                    return Ok(self.report(&notification, false, attempts, Some(reason)));
                }
                Err(TransportError::Transient(reason)) => {
                    notification.mark_failed(&reason);
                    self.notifications.save(&notification).await?;
                    if !policy.allows_another(attempts) {
                        warn!(%user_id, attempts, %reason, "Notification delivery failed");
                        return Ok(self.report(&notification, false, attempts, Some(reason)));
                    }
                    let delay = policy.delay_after_attempt(attempts);
                    debug!(
                        %user_id,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying delivery after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    notification.reset_for_retry();
                }
            }
        }
    }

    fn report(
        &self,
        notification: &Notification,
        success: bool,
        attempts: u32,
        error: Option<String>,
    ) -> SendReport {
        SendReport {
            notification_id: notification.id,
            success,
            status: notification.status,
            attempts,
            error,
        }
    }
}
