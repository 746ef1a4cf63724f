//! Inactivity decay and floor.

use crate::config::InactivityConfig;

/// Score after inactivity handling, with the amounts each step moved it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InactivityOutcome {
    pub score: f64,
    /// Points removed by exponential decay toward the target.
    pub decay_applied: f64,
    /// Points added by the floor.
    pub floor_applied: f64,
}

/// Apply inactivity handling to a post-replay score.
///
/// Past the grace period, a score above `decay_target` decays exponentially
/// toward it. Independently, any score past the grace period is raised to
/// `decay_floor`, so a quiet contributor who was already below the floor is
/// lifted to it.
pub fn apply_inactivity(score: f64, inactivity_days: f64, config: &InactivityConfig) -> InactivityOutcome {
    let mut outcome = InactivityOutcome {
        score,
        decay_applied: 0.0,
        floor_applied: 0.0,
    };

    if inactivity_days <= config.grace_period_days {
        return outcome;
    }

    if outcome.score > config.decay_target {
        let decaying_days = inactivity_days - config.grace_period_days;
        let retained = (-config.decay_rate_per_day * decaying_days).exp();
        let decayed = config.decay_target + (outcome.score - config.decay_target) * retained;
        outcome.decay_applied = outcome.score - decayed;
        outcome.score = decayed;
    }

    if outcome.score < config.decay_floor {
        outcome.floor_applied = config.decay_floor - outcome.score;
        outcome.score = config.decay_floor;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_grace_is_untouched() {
        let c = InactivityConfig::default();
        let out = apply_inactivity(80.0, 10.0, &c);
        assert_eq!(out.score, 80.0);
        assert_eq!(out.decay_applied, 0.0);
        assert_eq!(out.floor_applied, 0.0);

        // Floor also waits for the grace period.
        assert_eq!(apply_inactivity(5.0, 9.0, &c).score, 5.0);
    }

    #[test]
    fn test_decays_toward_target() {
        let c = InactivityConfig::default();
        let out = apply_inactivity(80.0, 110.0, &c);
        let expected = 40.0 + 40.0 * (-0.5_f64).exp();
        assert!((out.score - expected).abs() < 1e-9);
        assert!((out.decay_applied - (80.0 - expected)).abs() < 1e-9);
        assert!(out.score > c.decay_target);
    }

    #[test]
    fn test_between_floor_and_target_is_untouched() {
        let c = InactivityConfig::default();
        assert_eq!(apply_inactivity(35.0, 200.0, &c).score, 35.0);
    }

    #[test]
    fn test_floor_lifts_low_scores() {
        let c = InactivityConfig::default();
        let out = apply_inactivity(12.0, 11.0, &c);
        assert_eq!(out.score, 30.0);
        assert_eq!(out.floor_applied, 18.0);
        assert_eq!(out.decay_applied, 0.0);
    }
}
