//! Send-time guidance from historical click behavior.

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use tracing::debug;

use pulso_core::result::AppResult;
use pulso_core::types::id::UserId;
use pulso_store::NotificationRepository;

/// Hour used when a user has no click history yet.
const DEFAULT_SEND_HOUR: u32 = 10;

/// Recommends when to send to a user, based on when they have clicked
/// notifications in the past.
#[derive(Clone)]
pub struct SendTimeAdvisor {
    notifications: NotificationRepository,
}

impl SendTimeAdvisor {
    pub fn new(notifications: NotificationRepository) -> Self {
        Self { notifications }
    }

    /// The next occurrence of the user's most responsive hour of day.
    ///
    /// Builds an hour-of-day histogram over the user's `clicked_at`
    /// history and returns the densest hour's next occurrence strictly
    /// after `now`. Ties resolve to the earliest hour; with no history
    /// at all, the next 10:00.
    pub async fn get_optimal_send_time(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<DateTime<Utc>> {
        let rows = self.notifications.find_by_user(user_id).await?;

        let mut histogram = [0u32; 24];
        for row in &rows {
            if let Some(clicked_at) = row.clicked_at {
                histogram[clicked_at.hour() as usize] += 1;
            }
        }

        let mut best_hour = DEFAULT_SEND_HOUR;
        let mut best_count = 0u32;
        for (hour, &count) in histogram.iter().enumerate() {
            if count > best_count {
                best_count = count;
                best_hour = hour as u32;
            }
        }

        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let mut candidate = day_start + Duration::hours(i64::from(best_hour));
        if candidate <= now {
            candidate += Duration::days(1);
        }

        debug!(%user_id, best_hour, clicks = best_count, "Computed optimal send time");
        Ok(candidate)
    }
}
