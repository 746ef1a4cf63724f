//! Score result and diagnostic breakdown.

use serde::{Deserialize, Serialize};

use super::velocity::VelocityHit;
use crate::domain::{EventType, ReviewSeverity};
use crate::tier::TierDefinition;

/// Diagnostics for one replayed event.
///
/// Complexity and category are looked up for every event; only approvals and
/// rejections apply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDiagnostic {
    /// Position in chronological order.
    pub index: usize,
    pub event_type: EventType,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    pub days_since: f64,
    pub recency_weight: f64,
    pub complexity: String,
    pub complexity_multiplier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub category_multiplier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<ReviewSeverity>,
    pub severity_multiplier: f64,
    pub streak_multiplier: f64,
    pub diminishing_multiplier: f64,
    pub velocity_multiplier: f64,
    pub velocity_hit: VelocityHit,
    pub window_count: usize,
    /// Points before the velocity throttle and daily cap.
    pub raw_points: f64,
    /// Points actually added to the score.
    pub capped_points: f64,
    pub daily_cap_clipped: bool,
}

/// Aggregate diagnostics for a scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub initial_score: f64,
    pub manual_adjustment: f64,
    pub event_count: usize,
    pub positive_points: f64,
    pub negative_points: f64,
    /// Score after replay, before inactivity handling and clamping.
    pub score_before_inactivity: f64,
    pub inactivity_days: f64,
    pub decay_applied: f64,
    pub floor_applied: f64,
    pub velocity_soft_hits: u32,
    pub velocity_hard_hits: u32,
    pub daily_cap_clips: u32,
    pub events: Vec<EventDiagnostic>,
}

/// Outcome of scoring one contributor. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// 0–100, rounded to two decimals.
    pub score: f64,
    pub tier: String,
    pub tier_info: TierDefinition,
    pub breakdown: Breakdown,
    pub warnings: Vec<String>,
}
