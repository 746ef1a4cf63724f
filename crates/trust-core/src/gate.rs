//! Privilege gate rules engine.
//!
//! Evaluates a [`ScoreResult`] against a [`PrivilegeRuleSet`] to decide
//! whether a contributor may use an automated privilege such as auto-merge.

use serde::{Deserialize, Serialize};

use crate::engine::ScoreResult;
use crate::tier::{default_tiers, tier_rank, TierDefinition};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single rule that can withhold a privilege.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrivilegeRule {
    /// Current tier must be `tier` or better.
    MinTier { tier: String },
    /// Score must meet or exceed `score`.
    MinScore { score: f64 },
    /// No approval may have been suppressed by the velocity hard cap.
    NoHardVelocityHits,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrivilegeRuleSet {
    pub rules: Vec<PrivilegeRule>,
    /// Stop at the first violation.
    #[serde(default)]
    pub fail_fast: bool,
}

impl PrivilegeRuleSet {
    /// Auto-merge eligibility: `trusted` or better, with no hard velocity hits.
    pub fn auto_merge() -> Self {
        Self {
            rules: vec![
                PrivilegeRule::MinTier {
                    tier: "trusted".to_string(),
                },
                PrivilegeRule::NoHardVelocityHits,
            ],
            fail_fast: false,
        }
    }

    pub fn with_rule(mut self, rule: PrivilegeRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub rule: PrivilegeRule,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrivilegeVerdict {
    /// Empty when the privilege is granted.
    pub violations: Vec<Violation>,
}

impl PrivilegeVerdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate `result` against `rule_set`, ranking tiers by `tiers` (the
/// default table when empty).
pub fn evaluate_privilege(
    rule_set: &PrivilegeRuleSet,
    result: &ScoreResult,
    tiers: &[TierDefinition],
) -> PrivilegeVerdict {
    let defaults;
    let tiers = if tiers.is_empty() {
        defaults = default_tiers();
        &defaults[..]
    } else {
        tiers
    };

    let mut violations = Vec::new();
    for rule in &rule_set.rules {
        if let Some(v) = check_rule(rule, result, tiers) {
            violations.push(v);
            if rule_set.fail_fast {
                break;
            }
        }
    }
    PrivilegeVerdict { violations }
}

fn check_rule(
    rule: &PrivilegeRule,
    result: &ScoreResult,
    tiers: &[TierDefinition],
) -> Option<Violation> {
    let reason = match rule {
        PrivilegeRule::MinTier { tier } => match tier_rank(tier, tiers) {
            None => format!("unknown tier '{tier}'"),
            Some(required) => match tier_rank(&result.tier, tiers) {
                Some(current) if current <= required => return None,
                _ => format!("tier '{}' is below required '{tier}'", result.tier),
            },
        },
        PrivilegeRule::MinScore { score } => {
            if result.score >= *score {
                return None;
            }
            format!("score {:.2} < required {:.2}", result.score, score)
        }
        PrivilegeRule::NoHardVelocityHits => {
            let hits = result.breakdown.velocity_hard_hits;
            if hits == 0 {
                return None;
            }
            format!("{hits} event(s) exceeded the velocity hard cap")
        }
    };

    Some(Violation {
        rule: rule.clone(),
        reason,
    })
}
