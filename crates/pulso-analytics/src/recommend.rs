//! Rule-driven recommendations for the performance report.

use crate::types::{EngagementOverview, TypePerformance, UserEngagement};

/// Recommendations are truncated to this many entries.
pub(crate) const MAX_RECOMMENDATIONS: usize = 8;

/// Evaluate the fixed rule set, in order, against the computed report
/// pieces. Later rules are dropped once the cap is reached.
pub(crate) fn build_recommendations(
    overview: &EngagementOverview,
    by_type: &[TypePerformance],
    top: &[UserEngagement],
    low: &[UserEngagement],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if overview.delivery_rate < 85.0 {
        recommendations.push(
            "Delivery rate below 85%. Check push configuration and user permissions.".to_string(),
        );
    }
    if overview.click_rate < 15.0 {
        recommendations.push(
            "Click rate below 15%. Consider improving notification titles and content."
                .to_string(),
        );
    }
    if overview.engagement_rate < 10.0 {
        recommendations.push(
            "Overall engagement below 10%. Review notification frequency and relevance."
                .to_string(),
        );
    }

    for performance in by_type {
        if performance.total_sent <= 10 {
            continue;
        }
        if performance.click_rate < 10.0 {
            recommendations.push(format!(
                "{} notifications have low engagement. Consider personalizing the content.",
                performance.kind
            ));
        }
        if performance.delivery_rate < 80.0 {
            recommendations.push(format!(
                "Delivery problems for {}. Check type-specific configuration.",
                performance.kind
            ));
        }
    }

    if low.len() as f64 > top.len() as f64 * 0.3 {
        recommendations.push(
            "Many users show low engagement. Consider segmentation and personalization."
                .to_string(),
        );
    }

    if !top.is_empty() {
        let average = top.iter().map(|u| u.engagement_rate).sum::<f64>() / top.len() as f64;
        if average > 50.0 {
            recommendations.push(
                "Highly engaged users respond well. Apply similar strategies to other users."
                    .to_string(),
            );
        }
    }

    recommendations
        .push("Analyze peak engagement hours to optimize notification timing.".to_string());

    if overview.click_rate > 20.0 {
        recommendations.push("Good click rate. Keep the current content approach.".to_string());
    }

    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}
