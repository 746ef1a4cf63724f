use trust_core::{
    default_tiers, evaluate_privilege, score_contributor_at, ContributorState, Event, EventType,
    PrivilegeRule, PrivilegeRuleSet, ScoreResult, ScoringConfig,
};

const HOUR: i64 = 3_600_000;
const T0: i64 = 1_700_000_000_000;

fn scored(adjustment: f64, events: Vec<Event>) -> ScoreResult {
    let state = events.into_iter().fold(
        ContributorState::new("octocat", T0)
            .unwrap()
            .with_manual_adjustment(adjustment),
        ContributorState::with_event,
    );
    score_contributor_at(&state, &ScoringConfig::default(), T0)
}

#[test]
fn trusted_contributor_may_auto_merge() {
    let result = scored(50.0, vec![]);
    assert_eq!(result.tier, "trusted");

    let verdict = evaluate_privilege(&PrivilegeRuleSet::auto_merge(), &result, &default_tiers());
    assert!(verdict.passed());
}

#[test]
fn legendary_satisfies_trusted_requirement() {
    let result = scored(65.0, vec![]);
    assert_eq!(result.tier, "legendary");

    let verdict = evaluate_privilege(&PrivilegeRuleSet::auto_merge(), &result, &[]);
    assert!(verdict.passed());
}

#[test]
fn probationary_contributor_is_blocked() {
    let result = scored(0.0, vec![]);
    let verdict = evaluate_privilege(&PrivilegeRuleSet::auto_merge(), &result, &default_tiers());

    assert!(!verdict.passed());
    assert_eq!(verdict.violations.len(), 1);
    assert!(matches!(
        &verdict.violations[0].rule,
        PrivilegeRule::MinTier { tier } if tier == "trusted"
    ));
}

#[test]
fn velocity_hard_hits_block_even_high_scorers() {
    let events = (0..30)
        .map(|i| Event::new(EventType::Approve, T0 + i * HOUR))
        .collect();
    let result = scored(60.0, events);
    assert!(result.breakdown.velocity_hard_hits > 0);

    let verdict = evaluate_privilege(&PrivilegeRuleSet::auto_merge(), &result, &default_tiers());
    assert!(verdict
        .violations
        .iter()
        .any(|v| v.rule == PrivilegeRule::NoHardVelocityHits));
}

#[test]
fn fail_fast_stops_at_first_violation() {
    let result = scored(0.0, vec![]);
    let rules = PrivilegeRuleSet::auto_merge()
        .with_rule(PrivilegeRule::MinScore { score: 90.0 })
        .with_fail_fast(true);

    let verdict = evaluate_privilege(&rules, &result, &default_tiers());
    assert_eq!(verdict.violations.len(), 1);

    let verdict = evaluate_privilege(&rules.with_fail_fast(false), &result, &default_tiers());
    assert_eq!(verdict.violations.len(), 2);
}

#[test]
fn unknown_required_tier_is_a_violation() {
    let result = scored(60.0, vec![]);
    let rules = PrivilegeRuleSet {
        rules: vec![PrivilegeRule::MinTier {
            tier: "mythic".to_string(),
        }],
        fail_fast: false,
    };
    let verdict = evaluate_privilege(&rules, &result, &default_tiers());
    assert!(verdict.violations[0].reason.contains("unknown tier"));
}

#[test]
fn rule_set_loads_from_json() {
    let rules: PrivilegeRuleSet = serde_json::from_str(
        r#"{"rules": [{"type": "min_score", "score": 70.0}, {"type": "no_hard_velocity_hits"}]}"#,
    )
    .unwrap();
    assert!(!rules.fail_fast);

    let verdict = evaluate_privilege(&rules, &scored(40.0, vec![]), &default_tiers());
    assert!(verdict.passed());
}
