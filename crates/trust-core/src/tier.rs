//! Named trust bands.

use serde::{Deserialize, Serialize};

/// One band of the trust scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDefinition {
    pub name: String,
    pub min_score: f64,
    pub max_score: f64,
    pub meaning: String,
}

impl TierDefinition {
    pub fn new(name: &str, min_score: f64, max_score: f64, meaning: &str) -> Self {
        Self {
            name: name.to_string(),
            min_score,
            max_score,
            meaning: meaning.to_string(),
        }
    }
}

/// The default seven-band tier table, highest first.
pub fn default_tiers() -> Vec<TierDefinition> {
    vec![
        TierDefinition::new(
            "legendary",
            90.0,
            100.0,
            "Exceptional track record; eligible for every automated privilege",
        ),
        TierDefinition::new(
            "trusted",
            75.0,
            89.0,
            "Consistently approved work; eligible for auto-merge",
        ),
        TierDefinition::new(
            "established",
            60.0,
            74.0,
            "Reliable contributor; lightweight review",
        ),
        TierDefinition::new(
            "contributing",
            45.0,
            59.0,
            "Regular contributor building a record; standard review",
        ),
        TierDefinition::new(
            "probationary",
            30.0,
            44.0,
            "New or recovering contributor; full review required",
        ),
        TierDefinition::new(
            "untested",
            15.0,
            29.0,
            "Limited or poor history; enhanced review required",
        ),
        TierDefinition::new(
            "restricted",
            0.0,
            14.0,
            "Repeated problems; maintainer sign-off required",
        ),
    ]
}

/// Classify `score` against `tiers`.
///
/// Tiers are considered highest `min_score` first; the first whose
/// `min_score <= score` wins. Scores below every band fall back to the lowest
/// band, and an empty table falls back to [`default_tiers`], so this never
/// fails.
pub fn get_tier_info(score: f64, tiers: &[TierDefinition]) -> TierDefinition {
    if tiers.is_empty() {
        return get_tier_info(score, &default_tiers());
    }

    let mut ordered: Vec<&TierDefinition> = tiers.iter().collect();
    ordered.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));

    ordered
        .iter()
        .find(|t| t.min_score <= score)
        .or_else(|| ordered.last())
        .map(|t| (*t).clone())
        .unwrap_or_else(|| tiers[0].clone())
}

/// Position of the named tier in the table ordered highest first. Lower is
/// better; `None` for unknown names.
pub fn tier_rank(name: &str, tiers: &[TierDefinition]) -> Option<usize> {
    let mut ordered: Vec<&TierDefinition> = tiers.iter().collect();
    ordered.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
    ordered.iter().position(|t| t.name == name)
}
