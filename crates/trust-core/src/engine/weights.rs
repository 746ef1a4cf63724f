//! Per-event multipliers.

use std::collections::BTreeMap;

use crate::config::ComplexityBucket;
use crate::domain::{Event, ReviewSeverity};

/// `0.5^(days_since / half_life)`. A non-positive half-life disables recency
/// weighting.
pub fn recency_weight(days_since: f64, half_life_days: f64) -> f64 {
    if half_life_days <= 0.0 {
        return 1.0;
    }
    0.5_f64.powf(days_since / half_life_days)
}

/// First bucket, in ascending `max_lines` order (unbounded last), that holds
/// `lines_changed`.
///
/// A table without a catch-all falls back to its largest bucket; an empty
/// table is neutral.
pub fn complexity_for(lines_changed: u64, buckets: &[ComplexityBucket]) -> (String, f64) {
    let mut ordered: Vec<&ComplexityBucket> = buckets.iter().collect();
    ordered.sort_by_key(|b| b.max_lines.unwrap_or(u64::MAX));

    ordered
        .iter()
        .find(|b| b.max_lines.map_or(true, |max| lines_changed <= max))
        .or_else(|| ordered.last())
        .map(|b| (b.label.clone(), b.multiplier))
        .unwrap_or_else(|| ("unbucketed".to_string(), 1.0))
}

/// The label with the strictly greatest multiplier. Ties keep the label seen
/// first, so the result depends on label order.
pub fn category_for(
    labels: &[String],
    multipliers: &BTreeMap<String, f64>,
    default_multiplier: f64,
) -> (Option<String>, f64) {
    let mut best: Option<(&String, f64)> = None;
    for label in labels {
        if let Some(&m) = multipliers.get(label) {
            if best.map_or(true, |(_, current)| m > current) {
                best = Some((label, m));
            }
        }
    }
    match best {
        Some((label, m)) => (Some(label.clone()), m),
        None => (None, default_multiplier),
    }
}

/// Explicit severity, else one inferred from labels. Unknown severities
/// weigh 1.
pub fn severity_for(
    event: &Event,
    multipliers: &BTreeMap<String, f64>,
) -> (Option<ReviewSeverity>, f64) {
    let severity = event
        .review_severity
        .or_else(|| ReviewSeverity::infer_from_labels(&event.labels));
    let multiplier = severity
        .and_then(|s| multipliers.get(s.as_str()).copied())
        .unwrap_or(1.0);
    (severity, multiplier)
}

/// `1 / (1 + rate * ln(1 + prior_approvals))`.
pub fn diminishing_multiplier(prior_approvals: u32, rate: f64) -> f64 {
    1.0 / (1.0 + rate * (1.0 + prior_approvals as f64).ln())
}

pub fn approval_streak_multiplier(streak: u32, bonus: f64, cap: f64) -> f64 {
    let steps = streak.saturating_sub(1) as f64;
    (1.0 + bonus * steps).min(cap)
}

pub fn rejection_streak_multiplier(streak: u32, penalty_rate: f64, cap: f64) -> f64 {
    let steps = streak.saturating_sub(1) as i32;
    (1.0 + penalty_rate).powi(steps).min(cap)
}
