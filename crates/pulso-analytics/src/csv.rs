//! CSV rendering for analytics exports.
//!
//! The format is fixed: a per-type table, then optionally a blank line
//! and a per-user table. Lines end with `\n` and the output carries a
//! trailing newline. No field produced here needs quoting.

use std::fmt::Write;

use crate::types::{TypePerformance, UserEngagement};

const TYPE_HEADER: &str =
    "Type,Total Sent,Total Delivered,Total Clicked,Total Failed,Delivery Rate,Click Rate";
const USER_HEADER: &str = "User ID,Total Notifications,Clicked Notifications,Engagement Rate";

pub(crate) fn render(by_type: &[TypePerformance], users: Option<&[UserEngagement]>) -> String {
    let mut out = String::new();
    out.push_str(TYPE_HEADER);
    out.push('\n');
    for performance in by_type {
        // writeln! into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{},{:.2}%,{:.2}%",
            performance.kind,
            performance.total_sent,
            performance.total_delivered,
            performance.total_clicked,
            performance.total_failed,
            performance.delivery_rate,
            performance.click_rate,
        );
    }

    if let Some(users) = users {
        out.push('\n');
        out.push_str(USER_HEADER);
        out.push('\n');
        for user in users {
            let _ = writeln!(
                out,
                "{},{},{},{:.2}%",
                user.user_id, user.total, user.clicked, user.engagement_rate,
            );
        }
    }

    out
}
