//! Report shapes produced by the analytics service.
//!
//! All rates in these types are percentages in `[0, 100]`, defined as
//! `0.0` whenever the denominator is zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::types::id::UserId;
use pulso_entity::NotificationType;

/// Per-day delivery counts. A click implies delivery and delivery
/// implies a send, so the columns are monotone within a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sent: u64,
    pub delivered: u64,
    pub clicked: u64,
    pub failed: u64,
}

impl TrendPoint {
    /// A zeroed entry for one day.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sent: 0,
            delivered: 0,
            clicked: 0,
            failed: 0,
        }
    }
}

/// Aggregate counts and rates over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementOverview {
    /// Rows that reached the transport (failures included).
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_clicked: u64,
    pub total_failed: u64,
    /// delivered / sent × 100.
    pub delivery_rate: f64,
    /// clicked / delivered × 100.
    pub click_rate: f64,
    /// clicked / sent × 100.
    pub engagement_rate: f64,
}

/// Counts and rates for one notification category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypePerformance {
    pub kind: NotificationType,
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_clicked: u64,
    pub total_failed: u64,
    pub delivery_rate: f64,
    pub click_rate: f64,
}

/// One user's engagement over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEngagement {
    pub user_id: UserId,
    /// Notifications that reached the transport for this user.
    pub total: u64,
    pub clicked: u64,
    /// clicked / total × 100.
    pub engagement_rate: f64,
    /// Most recent click or send activity in the window.
    pub last_activity: DateTime<Utc>,
    /// Categories the user actually clicks, highest click rate first,
    /// capped at three.
    pub preferred_types: Vec<NotificationType>,
}

/// The most and least engaged user cohorts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementCohorts {
    /// Engagement rate descending, capped at 10.
    pub top: Vec<UserEngagement>,
    /// Users under 20% engagement, rate ascending, capped at 10.
    pub low: Vec<UserEngagement>,
}

/// Full performance report over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub overview: EngagementOverview,
    pub by_type: Vec<TypePerformance>,
    pub trends: Vec<TrendPoint>,
    pub top_engaged_users: Vec<UserEngagement>,
    pub low_engagement_users: Vec<UserEngagement>,
    /// Ordered advice derived from the fixed rule set, at most eight
    /// entries.
    pub recommendations: Vec<String>,
}
