//! # pulso-analytics
//!
//! Read-side engagement analytics for the Pulso notification engine.
//! Reports are computed on demand from the notification history window;
//! interaction tracking is the only write path, settling history rows
//! at `Delivered` or `Clicked` as receipts arrive.

mod csv;
mod recommend;
pub mod service;
pub mod types;

pub use service::AnalyticsService;
pub use types::{
    EngagementCohorts, EngagementOverview, PerformanceReport, TrendPoint, TypePerformance,
    UserEngagement,
};
