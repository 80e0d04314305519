//! Report building over the notification history.
//!
//! Every report is computed from the rows returned by a single window
//! query; nothing here keeps state of its own. Counting model:
//!
//! * `total_sent` counts rows that reached the transport, including
//!   failures (`was_attempted`).
//! * `total_delivered` counts rows confirmed shown (`Delivered` or
//!   `Clicked`).
//! * Trend points count `sent` without failures, so per-day
//!   `clicked <= delivered <= sent` holds.
//!
//! Rates are percentages in `0.0..=100.0` and are `0.0` whenever the
//! denominator is zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pulso_core::result::AppResult;
use pulso_core::types::id::{NotificationId, UserId};
use pulso_entity::{
    InteractionEvent, InteractionKind, Notification, NotificationStatus, NotificationType,
};
use pulso_store::{InteractionRepository, NotificationRepository};

use crate::csv;
use crate::recommend::build_recommendations;
use crate::types::{
    EngagementCohorts, EngagementOverview, PerformanceReport, TrendPoint, TypePerformance,
    UserEngagement,
};

/// Engagement cohorts are capped at this many users each.
const MAX_COHORT: usize = 10;

/// Users below this engagement percentage land in the low cohort.
const LOW_ENGAGEMENT_THRESHOLD: f64 = 20.0;

/// Read-side analytics over notification history and interactions.
#[derive(Clone)]
pub struct AnalyticsService {
    notifications: NotificationRepository,
    interactions: InteractionRepository,
}

impl AnalyticsService {
    pub fn new(
        notifications: NotificationRepository,
        interactions: InteractionRepository,
    ) -> Self {
        Self {
            notifications,
            interactions,
        }
    }

    /// Per-day counts for every date in the window, oldest first. Days
    /// without activity are present with zero counts.
    pub async fn notification_trends(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<TrendPoint>> {
        let rows = self.notifications.find_in_window(start, end).await?;
        Ok(build_trends(&rows, start, end))
    }

    /// Top and low engagement cohorts for the window.
    pub async fn user_engagement(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<EngagementCohorts> {
        let rows = self.notifications.find_in_window(start, end).await?;
        Ok(build_cohorts(&build_user_entries(&rows)))
    }

    /// The full report: overview, per-type breakdown, daily trends,
    /// engagement cohorts, and recommendations.
    pub async fn performance_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<PerformanceReport> {
        let rows = self.notifications.find_in_window(start, end).await?;

        let overview = build_overview(&rows);
        let by_type = build_type_performance(&rows);
        let trends = build_trends(&rows, start, end);
        let cohorts = build_cohorts(&build_user_entries(&rows));
        let recommendations =
            build_recommendations(&overview, &by_type, &cohorts.top, &cohorts.low);

        info!(
            rows = rows.len(),
            start = %start,
            end = %end,
            "built notification performance report"
        );

        Ok(PerformanceReport {
            overview,
            by_type,
            trends,
            top_engaged_users: cohorts.top,
            low_engagement_users: cohorts.low,
            recommendations,
        })
    }

    /// Render the per-type table as CSV. With `include_user_data` the
    /// per-user table follows after a blank line; user rows are not
    /// capped the way report cohorts are.
    pub async fn export_csv(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        include_user_data: bool,
    ) -> AppResult<String> {
        let rows = self.notifications.find_in_window(start, end).await?;
        let by_type = build_type_performance(&rows);
        let users = include_user_data.then(|| build_user_entries(&rows));

        debug!(
            rows = rows.len(),
            include_user_data, "rendered analytics CSV export"
        );
        Ok(csv::render(&by_type, users.as_deref()))
    }

    /// Record a raw interaction event and settle the notification row
    /// it refers to.
    ///
    /// The event is appended even when the notification is unknown or
    /// already settled; the raw log is the source of truth for later
    /// analysis. Row updates only move forward: a click on an already
    /// clicked row and a delivery receipt for a clicked row are both
    /// no-ops.
    pub async fn track_interaction(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        kind: InteractionKind,
        metadata: serde_json::Value,
    ) -> AppResult<InteractionEvent> {
        let event = InteractionEvent::new(notification_id, user_id, kind, metadata);
        self.interactions.append(&event).await?;

        if let Some(mut notification) = self.notifications.get(notification_id).await? {
            match kind.settles_at() {
                NotificationStatus::Clicked
                    if notification.status.was_sent()
                        && notification.status != NotificationStatus::Clicked =>
                {
                    notification.mark_clicked(event.occurred_at);
                    self.notifications.save(&notification).await?;
                }
                NotificationStatus::Delivered
                    if notification.status == NotificationStatus::Sent =>
                {
                    notification.mark_delivered(event.occurred_at);
                    self.notifications.save(&notification).await?;
                }
                _ => {}
            }
        }

        info!(
            notification_id = %notification_id,
            user_id = %user_id,
            kind = ?kind,
            "recorded notification interaction"
        );
        Ok(event)
    }
}

/// `part / whole` as a percentage, `0.0` when `whole` is zero.
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn build_overview(rows: &[Notification]) -> EngagementOverview {
    let mut sent = 0u64;
    let mut delivered = 0u64;
    let mut clicked = 0u64;
    let mut failed = 0u64;

    for row in rows {
        if row.was_attempted() {
            sent += 1;
        }
        if row.status.was_delivered() {
            delivered += 1;
        }
        if row.status == NotificationStatus::Clicked {
            clicked += 1;
        }
        if row.status == NotificationStatus::Failed {
            failed += 1;
        }
    }

    EngagementOverview {
        total_sent: sent,
        total_delivered: delivered,
        total_clicked: clicked,
        total_failed: failed,
        delivery_rate: percentage(delivered, sent),
        click_rate: percentage(clicked, delivered),
        engagement_rate: percentage(clicked, sent),
    }
}

/// One entry per notification type, in declaration order, including
/// types with no rows in the window.
fn build_type_performance(rows: &[Notification]) -> Vec<TypePerformance> {
    NotificationType::ALL
        .iter()
        .map(|kind| {
            let mut sent = 0u64;
            let mut delivered = 0u64;
            let mut clicked = 0u64;
            let mut failed = 0u64;

            for row in rows.iter().filter(|r| r.kind == *kind) {
                if row.was_attempted() {
                    sent += 1;
                }
                if row.status.was_delivered() {
                    delivered += 1;
                }
                if row.status == NotificationStatus::Clicked {
                    clicked += 1;
                }
                if row.status == NotificationStatus::Failed {
                    failed += 1;
                }
            }

            TypePerformance {
                kind: *kind,
                total_sent: sent,
                total_delivered: delivered,
                total_clicked: clicked,
                total_failed: failed,
                delivery_rate: percentage(delivered, sent),
                click_rate: percentage(clicked, delivered),
            }
        })
        .collect()
}

/// One point per calendar day from `start` to `end` inclusive, rows
/// bucketed by their activity timestamp.
fn build_trends(
    rows: &[Notification],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let first = start.date_naive();
    let last = end.date_naive();
    if last < first {
        return Vec::new();
    }

    let mut points = Vec::new();
    let mut day = first;
    while day <= last {
        points.push(TrendPoint::empty(day));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    for row in rows {
        let offset = row
            .activity_at()
            .date_naive()
            .signed_duration_since(first)
            .num_days();
        if offset < 0 || offset as usize >= points.len() {
            continue;
        }

        let point = &mut points[offset as usize];
        if row.status.was_sent() {
            point.sent += 1;
        }
        if row.status.was_delivered() {
            point.delivered += 1;
        }
        if row.status == NotificationStatus::Clicked {
            point.clicked += 1;
        }
        if row.status == NotificationStatus::Failed {
            point.failed += 1;
        }
    }

    points
}

/// Per-user engagement over attempted rows, sorted by engagement rate
/// descending with the user id breaking ties.
fn build_user_entries(rows: &[Notification]) -> Vec<UserEngagement> {
    let mut by_user: HashMap<UserId, Vec<&Notification>> = HashMap::new();
    for row in rows.iter().filter(|r| r.was_attempted()) {
        by_user.entry(row.user_id).or_default().push(row);
    }

    let mut entries: Vec<UserEngagement> = by_user
        .into_iter()
        .map(|(user_id, history)| {
            let total = history.len() as u64;
            let clicked = history
                .iter()
                .filter(|r| r.status == NotificationStatus::Clicked)
                .count() as u64;
            let last_activity = history
                .iter()
                .map(|r| r.clicked_at.unwrap_or_else(|| r.activity_at()))
                .max()
                .unwrap_or(DateTime::<Utc>::MIN_UTC);

            let mut click_counts: Vec<(NotificationType, usize)> = NotificationType::ALL
                .iter()
                .map(|kind| {
                    let clicks = history
                        .iter()
                        .filter(|r| r.kind == *kind && r.status == NotificationStatus::Clicked)
                        .count();
                    (*kind, clicks)
                })
                .filter(|(_, clicks)| *clicks > 0)
                .collect();
            // Stable sort keeps declaration order between equal counts.
            click_counts.sort_by(|a, b| b.1.cmp(&a.1));
            let preferred_types = click_counts.into_iter().take(3).map(|(kind, _)| kind).collect();

            UserEngagement {
                user_id,
                total,
                clicked,
                engagement_rate: percentage(clicked, total),
                last_activity,
                preferred_types,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.engagement_rate
            .total_cmp(&a.engagement_rate)
            .then_with(|| a.user_id.as_uuid().cmp(b.user_id.as_uuid()))
    });
    entries
}

/// Split sorted entries into the top cohort and the low cohort. The low
/// cohort is ordered worst first.
fn build_cohorts(entries: &[UserEngagement]) -> EngagementCohorts {
    let top = entries.iter().take(MAX_COHORT).cloned().collect();

    let mut low: Vec<UserEngagement> = entries
        .iter()
        .filter(|e| e.engagement_rate < LOW_ENGAGEMENT_THRESHOLD)
        .cloned()
        .collect();
    low.sort_by(|a, b| {
        a.engagement_rate
            .total_cmp(&b.engagement_rate)
            .then_with(|| a.user_id.as_uuid().cmp(b.user_id.as_uuid()))
    });
    low.truncate(MAX_COHORT);

    EngagementCohorts { top, low }
}
