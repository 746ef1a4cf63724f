//! Scoring configuration and override resolution.
//!
//! [`ScoringConfig`] is an immutable value: construct it once (defaults, a
//! preset, or defaults merged with [`ConfigOverrides`]) and pass it by
//! reference into every scoring call. Resolution never mutates the base value;
//! it returns a new one.
//!
//! Merge rules for [`ScoringConfig::with_overrides`]:
//! - scalar keys replace when present;
//! - `basePoints`, `velocity`, `inactivity`, `categoryMultipliers` and
//!   `reviewSeverityMultipliers` merge key by key;
//! - `complexityMultipliers` and `tiers` replace wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tier::{default_tiers, TierDefinition};

/// Points awarded (or deducted) per outcome before weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePoints {
    pub approve: f64,
    pub reject: f64,
    pub close: f64,
}

impl Default for BasePoints {
    fn default() -> Self {
        Self {
            approve: 8.0,
            reject: 10.0,
            close: 2.0,
        }
    }
}

/// Rolling-window burst throttle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityConfig {
    #[serde(rename = "softCapPRs")]
    pub soft_cap_prs: u32,
    #[serde(rename = "hardCapPRs")]
    pub hard_cap_prs: u32,
    #[serde(rename = "penaltyPerPR")]
    pub penalty_per_pr: f64,
    #[serde(rename = "windowDays")]
    pub window_days: f64,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            soft_cap_prs: 10,
            hard_cap_prs: 25,
            penalty_per_pr: 0.15,
            window_days: 7.0,
        }
    }
}

/// Decay toward `decay_target` once a contributor goes quiet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityConfig {
    pub grace_period_days: f64,
    pub decay_rate_per_day: f64,
    pub decay_floor: f64,
    pub decay_target: f64,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            grace_period_days: 10.0,
            decay_rate_per_day: 0.005,
            decay_floor: 30.0,
            decay_target: 40.0,
        }
    }
}

/// Size bucket. `max_lines: None` is the unbounded catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityBucket {
    pub max_lines: Option<u64>,
    pub multiplier: f64,
    pub label: String,
}

impl ComplexityBucket {
    pub fn new(max_lines: Option<u64>, multiplier: f64, label: &str) -> Self {
        Self {
            max_lines,
            multiplier,
            label: label.to_string(),
        }
    }
}

fn default_complexity() -> Vec<ComplexityBucket> {
    vec![
        ComplexityBucket::new(Some(10), 0.4, "trivial"),
        ComplexityBucket::new(Some(50), 0.7, "small"),
        ComplexityBucket::new(Some(150), 1.0, "medium"),
        ComplexityBucket::new(Some(500), 1.3, "large"),
        ComplexityBucket::new(Some(1500), 1.5, "xlarge"),
        // Deliberately below xlarge: giant diffs are harder to review well.
        ComplexityBucket::new(None, 1.2, "massive"),
    ]
}

fn default_categories() -> BTreeMap<String, f64> {
    [
        ("security", 1.8),
        ("critical-fix", 1.5),
        ("core", 1.3),
        ("feature", 1.1),
        ("bugfix", 1.0),
        ("refactor", 0.9),
        ("test", 0.8),
        ("docs", 0.6),
        ("chore", 0.5),
        ("aesthetic", 0.4),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_severities() -> BTreeMap<String, f64> {
    [
        ("critical", 1.8),
        ("major", 1.3),
        ("normal", 1.0),
        ("minor", 0.5),
        ("trivial", 0.3),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Fully resolved scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub initial_score: f64,
    pub diminishing_rate: f64,
    pub recency_half_life_days: f64,
    pub daily_point_cap: f64,
    pub base_points: BasePoints,
    /// Bonus per consecutive approval after the first.
    pub approval_streak_bonus: f64,
    pub approval_streak_cap: f64,
    /// Compounding penalty per consecutive rejection after the first.
    pub rejection_streak_penalty: f64,
    pub rejection_streak_cap: f64,
    pub velocity: VelocityConfig,
    pub inactivity: InactivityConfig,
    pub complexity_multipliers: Vec<ComplexityBucket>,
    pub category_multipliers: BTreeMap<String, f64>,
    pub default_category_multiplier: f64,
    pub review_severity_multipliers: BTreeMap<String, f64>,
    pub tiers: Vec<TierDefinition>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            initial_score: 35.0,
            diminishing_rate: 0.2,
            recency_half_life_days: 45.0,
            daily_point_cap: 35.0,
            base_points: BasePoints::default(),
            approval_streak_bonus: 0.08,
            approval_streak_cap: 1.5,
            rejection_streak_penalty: 0.15,
            rejection_streak_cap: 2.5,
            velocity: VelocityConfig::default(),
            inactivity: InactivityConfig::default(),
            complexity_multipliers: default_complexity(),
            category_multipliers: default_categories(),
            default_category_multiplier: 0.8,
            review_severity_multipliers: default_severities(),
            tiers: default_tiers(),
        }
    }
}

impl ScoringConfig {
    /// The default configuration.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Preset for populations with legitimately high throughput (bots,
    /// release managers, large monorepo teams).
    pub fn high_velocity() -> Self {
        Self::default().with_overrides(&ConfigOverrides::high_velocity())
    }

    /// Merge `overrides` onto `self`, returning a new configuration.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut merged = self.clone();

        if let Some(v) = overrides.initial_score {
            merged.initial_score = v;
        }
        if let Some(v) = overrides.diminishing_rate {
            merged.diminishing_rate = v;
        }
        if let Some(v) = overrides.recency_half_life_days {
            merged.recency_half_life_days = v;
        }
        if let Some(v) = overrides.daily_point_cap {
            merged.daily_point_cap = v;
        }
        if let Some(v) = overrides.approval_streak_bonus {
            merged.approval_streak_bonus = v;
        }
        if let Some(v) = overrides.approval_streak_cap {
            merged.approval_streak_cap = v;
        }
        if let Some(v) = overrides.rejection_streak_penalty {
            merged.rejection_streak_penalty = v;
        }
        if let Some(v) = overrides.rejection_streak_cap {
            merged.rejection_streak_cap = v;
        }
        if let Some(v) = overrides.default_category_multiplier {
            merged.default_category_multiplier = v;
        }

        if let Some(bp) = &overrides.base_points {
            bp.apply(&mut merged.base_points);
        }
        if let Some(vel) = &overrides.velocity {
            vel.apply(&mut merged.velocity);
        }
        if let Some(ina) = &overrides.inactivity {
            ina.apply(&mut merged.inactivity);
        }

        if let Some(categories) = &overrides.category_multipliers {
            for (label, multiplier) in categories {
                merged
                    .category_multipliers
                    .insert(label.trim().to_lowercase(), *multiplier);
            }
        }
        if let Some(severities) = &overrides.review_severity_multipliers {
            for (severity, multiplier) in severities {
                merged
                    .review_severity_multipliers
                    .insert(severity.trim().to_lowercase(), *multiplier);
            }
        }

        if let Some(buckets) = &overrides.complexity_multipliers {
            merged.complexity_multipliers = buckets.clone();
        }
        if let Some(tiers) = &overrides.tiers {
            merged.tiers = tiers.clone();
        }

        merged
    }
}

/// Resolve a configuration by merging `overrides` onto the defaults.
pub fn with_config(overrides: &ConfigOverrides) -> ScoringConfig {
    ScoringConfig::default().with_overrides(overrides)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasePointsOverride {
    pub approve: Option<f64>,
    pub reject: Option<f64>,
    pub close: Option<f64>,
}

impl BasePointsOverride {
    fn apply(&self, target: &mut BasePoints) {
        if let Some(v) = self.approve {
            target.approve = v;
        }
        if let Some(v) = self.reject {
            target.reject = v;
        }
        if let Some(v) = self.close {
            target.close = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityOverride {
    #[serde(rename = "softCapPRs")]
    pub soft_cap_prs: Option<u32>,
    #[serde(rename = "hardCapPRs")]
    pub hard_cap_prs: Option<u32>,
    #[serde(rename = "penaltyPerPR")]
    pub penalty_per_pr: Option<f64>,
    #[serde(rename = "windowDays")]
    pub window_days: Option<f64>,
}

impl VelocityOverride {
    fn apply(&self, target: &mut VelocityConfig) {
        if let Some(v) = self.soft_cap_prs {
            target.soft_cap_prs = v;
        }
        if let Some(v) = self.hard_cap_prs {
            target.hard_cap_prs = v;
        }
        if let Some(v) = self.penalty_per_pr {
            target.penalty_per_pr = v;
        }
        if let Some(v) = self.window_days {
            target.window_days = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InactivityOverride {
    pub grace_period_days: Option<f64>,
    pub decay_rate_per_day: Option<f64>,
    pub decay_floor: Option<f64>,
    pub decay_target: Option<f64>,
}

impl InactivityOverride {
    fn apply(&self, target: &mut InactivityConfig) {
        if let Some(v) = self.grace_period_days {
            target.grace_period_days = v;
        }
        if let Some(v) = self.decay_rate_per_day {
            target.decay_rate_per_day = v;
        }
        if let Some(v) = self.decay_floor {
            target.decay_floor = v;
        }
        if let Some(v) = self.decay_target {
            target.decay_target = v;
        }
    }
}

/// Partial configuration. Every field is optional; absent fields keep the
/// base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub initial_score: Option<f64>,
    pub diminishing_rate: Option<f64>,
    pub recency_half_life_days: Option<f64>,
    pub daily_point_cap: Option<f64>,
    pub base_points: Option<BasePointsOverride>,
    pub approval_streak_bonus: Option<f64>,
    pub approval_streak_cap: Option<f64>,
    pub rejection_streak_penalty: Option<f64>,
    pub rejection_streak_cap: Option<f64>,
    pub velocity: Option<VelocityOverride>,
    pub inactivity: Option<InactivityOverride>,
    pub complexity_multipliers: Option<Vec<ComplexityBucket>>,
    pub category_multipliers: Option<BTreeMap<String, f64>>,
    pub default_category_multiplier: Option<f64>,
    pub review_severity_multipliers: Option<BTreeMap<String, f64>>,
    pub tiers: Option<Vec<TierDefinition>>,
}

impl ConfigOverrides {
    /// Overrides that turn the defaults into the high-velocity preset.
    pub fn high_velocity() -> Self {
        Self {
            initial_score: Some(40.0),
            diminishing_rate: Some(0.08),
            daily_point_cap: Some(80.0),
            velocity: Some(VelocityOverride {
                soft_cap_prs: Some(80),
                hard_cap_prs: Some(200),
                ..VelocityOverride::default()
            }),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match_policy_table() {
        let c = ScoringConfig::default();
        assert_eq!(c.initial_score, 35.0);
        assert_eq!(c.diminishing_rate, 0.2);
        assert_eq!(c.recency_half_life_days, 45.0);
        assert_eq!(c.daily_point_cap, 35.0);
        assert_eq!(c.base_points, BasePoints::default());
        assert_eq!(c.velocity.soft_cap_prs, 10);
        assert_eq!(c.velocity.hard_cap_prs, 25);
        assert_eq!(c.inactivity.decay_floor, 30.0);
        assert_eq!(c.category_multipliers["critical-fix"], 1.5);
        assert_eq!(c.review_severity_multipliers["trivial"], 0.3);
        assert_eq!(c.complexity_multipliers.len(), 6);
        assert_eq!(c.complexity_multipliers[5].max_lines, None);
        assert_eq!(c.tiers.len(), 7);
    }

    #[test]
    fn test_nested_groups_merge_key_by_key() {
        let overrides: ConfigOverrides = serde_json::from_value(json!({
            "basePoints": { "approve": 12 },
            "velocity": { "hardCapPRs": 40 },
            "inactivity": { "decayFloor": 20 },
            "categoryMultipliers": { "Perf": 1.2 },
            "reviewSeverityMultipliers": { "critical": 2.0 }
        }))
        .unwrap();
        let c = with_config(&overrides);

        assert_eq!(c.base_points.approve, 12.0);
        assert_eq!(c.base_points.reject, 10.0);
        assert_eq!(c.velocity.hard_cap_prs, 40);
        assert_eq!(c.velocity.soft_cap_prs, 10);
        assert_eq!(c.inactivity.decay_floor, 20.0);
        assert_eq!(c.inactivity.decay_target, 40.0);
        assert_eq!(c.category_multipliers["perf"], 1.2);
        assert_eq!(c.category_multipliers["security"], 1.8);
        assert_eq!(c.review_severity_multipliers["critical"], 2.0);
        assert_eq!(c.review_severity_multipliers["major"], 1.3);
    }

    #[test]
    fn test_complexity_and_tiers_replace_wholesale() {
        let overrides: ConfigOverrides = serde_json::from_value(json!({
            "complexityMultipliers": [ { "maxLines": null, "multiplier": 1.0, "label": "any" } ],
            "tiers": [ { "name": "member", "minScore": 0, "maxScore": 100, "meaning": "everyone" } ]
        }))
        .unwrap();
        let c = with_config(&overrides);
        assert_eq!(c.complexity_multipliers.len(), 1);
        assert_eq!(c.tiers.len(), 1);
        assert_eq!(c.tiers[0].name, "member");
    }

    #[test]
    fn test_merge_does_not_mutate_base() {
        let base = ScoringConfig::default();
        let merged = base.with_overrides(&ConfigOverrides {
            initial_score: Some(50.0),
            ..ConfigOverrides::default()
        });
        assert_eq!(base.initial_score, 35.0);
        assert_eq!(merged.initial_score, 50.0);
    }

    #[test]
    fn test_high_velocity_preset() {
        let c = ScoringConfig::high_velocity();
        assert_eq!(c.initial_score, 40.0);
        assert_eq!(c.diminishing_rate, 0.08);
        assert_eq!(c.daily_point_cap, 80.0);
        assert_eq!(c.velocity.soft_cap_prs, 80);
        assert_eq!(c.velocity.hard_cap_prs, 200);
        assert_eq!(c.velocity.penalty_per_pr, 0.15);
        assert_eq!(c.recency_half_life_days, 45.0);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let c = ScoringConfig::default();
        let json = serde_json::to_string(&c).expect("serialize");
        assert!(json.contains("\"softCapPRs\":10"));
        let back: ScoringConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(c, back);
    }
}
