//! Replay scoring engine.
//!
//! Replays a contributor's event log in chronological order against a
//! [`ScoringConfig`] and an evaluation instant, producing a [`ScoreResult`].
//! Scoring is pure: the same `(state, config, now)` always yields the same
//! result, and neither the state nor the configuration is modified.
//!
//! Per event, in order:
//! 1. recency weight, complexity and category lookups;
//! 2. rolling-window velocity count over every non-`selfClose` event;
//! 3. outcome-specific points (approvals additionally pass through the
//!    velocity throttle and the per-UTC-day point cap).
//!
//! After replay, inactivity decay and the inactivity floor are applied, and
//! the score is clamped to `[0, 100]` and rounded to two decimals.

pub mod decay;
pub mod result;
pub mod velocity;
pub mod weights;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::ScoringConfig;
use crate::domain::{ContributorState, Event, EventType, MS_PER_DAY};
use crate::obs;
use crate::tier::get_tier_info;

pub use decay::{apply_inactivity, InactivityOutcome};
pub use result::{Breakdown, EventDiagnostic, ScoreResult};
pub use velocity::VelocityHit;

use velocity::{velocity_multiplier, window_count};
use weights::{
    approval_streak_multiplier, category_for, complexity_for, diminishing_multiplier,
    recency_weight, rejection_streak_multiplier, severity_for,
};

/// Score `state` as of `now`.
pub fn score_contributor(
    state: &ContributorState,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> ScoreResult {
    score_contributor_at(state, config, now.timestamp_millis())
}

/// Score `state` as of `now_ms` (epoch milliseconds).
pub fn score_contributor_at(
    state: &ContributorState,
    config: &ScoringConfig,
    now_ms: i64,
) -> ScoreResult {
    let mut events: Vec<&Event> = state.events.iter().collect();
    events.sort_by_key(|e| e.timestamp);

    let mut replay = Replay::new(config, now_ms);
    replay.score = config.initial_score + state.manual_adjustment;
    for index in 0..events.len() {
        replay.step(&events, index);
    }

    let last_ts = events.last().map_or(state.created_at, |e| e.timestamp);
    let inactivity_days = days_between(last_ts, now_ms);
    let score_before_inactivity = replay.score;
    let inactivity = apply_inactivity(replay.score, inactivity_days, &config.inactivity);

    let score = round2(inactivity.score.clamp(0.0, 100.0));
    let tier_info = get_tier_info(score, &config.tiers);

    ScoreResult {
        score,
        tier: tier_info.name.clone(),
        tier_info,
        breakdown: Breakdown {
            initial_score: config.initial_score,
            manual_adjustment: state.manual_adjustment,
            event_count: events.len(),
            positive_points: replay.positive_points,
            negative_points: replay.negative_points,
            score_before_inactivity,
            inactivity_days,
            decay_applied: inactivity.decay_applied,
            floor_applied: inactivity.floor_applied,
            velocity_soft_hits: replay.soft_hits,
            velocity_hard_hits: replay.hard_hits,
            daily_cap_clips: replay.clips,
            events: replay.diagnostics,
        },
        warnings: replay.warnings,
    }
}

/// Mutable accumulator for one replay.
struct Replay<'a> {
    config: &'a ScoringConfig,
    now_ms: i64,
    score: f64,
    prior_approvals: u32,
    approval_streak: u32,
    rejection_streak: u32,
    /// UTC day index → positive points granted that day.
    daily_positive: BTreeMap<i64, f64>,
    positive_points: f64,
    negative_points: f64,
    soft_hits: u32,
    hard_hits: u32,
    clips: u32,
    warnings: Vec<String>,
    diagnostics: Vec<EventDiagnostic>,
}

impl<'a> Replay<'a> {
    fn new(config: &'a ScoringConfig, now_ms: i64) -> Self {
        Self {
            config,
            now_ms,
            score: 0.0,
            prior_approvals: 0,
            approval_streak: 0,
            rejection_streak: 0,
            daily_positive: BTreeMap::new(),
            positive_points: 0.0,
            negative_points: 0.0,
            soft_hits: 0,
            hard_hits: 0,
            clips: 0,
            warnings: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn step(&mut self, events: &[&Event], index: usize) {
        let config = self.config;
        let event = events[index];

        let days_since = days_between(event.timestamp, self.now_ms);
        let recency = recency_weight(days_since, config.recency_half_life_days);
        let (complexity, complexity_multiplier) =
            complexity_for(event.lines_changed, &config.complexity_multipliers);
        let (category, category_multiplier) = category_for(
            &event.labels,
            &config.category_multipliers,
            config.default_category_multiplier,
        );

        let window = window_count(events, index, config.velocity.window_days);
        let (velocity, mut velocity_hit) = velocity_multiplier(window, &config.velocity);
        if !event.event_type.counts_toward_velocity() {
            velocity_hit = VelocityHit::None;
        }
        match velocity_hit {
            VelocityHit::None => {}
            VelocityHit::Soft => self.soft_hits += 1,
            VelocityHit::Hard => {
                self.hard_hits += 1;
                let suffix = if event.event_type == EventType::Approve {
                    "; approval points suppressed"
                } else {
                    ""
                };
                self.warnings.push(format!(
                    "event #{index} ({}, {}): {window} events in {}-day window exceeds velocity hard cap of {}{suffix}",
                    event.event_type,
                    format_day(event.timestamp),
                    config.velocity.window_days,
                    config.velocity.hard_cap_prs,
                ));
                obs::emit_velocity_hard_cap(event.timestamp, window, config.velocity.hard_cap_prs);
            }
        }

        let mut diminishing = 1.0;
        let mut streak_multiplier = 1.0;
        let mut severity = None;
        let mut severity_multiplier = 1.0;
        let mut clipped = false;

        let (raw_points, capped_points) = match event.event_type {
            EventType::Approve => {
                diminishing = diminishing_multiplier(self.prior_approvals, config.diminishing_rate);
                self.approval_streak += 1;
                self.rejection_streak = 0;
                streak_multiplier = approval_streak_multiplier(
                    self.approval_streak,
                    config.approval_streak_bonus,
                    config.approval_streak_cap,
                );

                let raw = config.base_points.approve
                    * diminishing
                    * recency
                    * complexity_multiplier
                    * category_multiplier
                    * streak_multiplier;
                let mut points = raw * velocity;

                let used = self.daily_positive.entry(event.utc_day()).or_insert(0.0);
                let remaining = (config.daily_point_cap - *used).max(0.0);
                if points > remaining {
                    clipped = true;
                    self.clips += 1;
                    self.warnings.push(format!(
                        "event #{index} ({}): approval points clipped from {points:.2} to {remaining:.2} by daily cap of {}",
                        format_day(event.timestamp),
                        config.daily_point_cap,
                    ));
                    obs::emit_daily_cap_clipped(event.timestamp, points, remaining);
                    points = remaining;
                }
                *used += points;

                self.prior_approvals += 1;
                (raw, points)
            }
            EventType::Reject => {
                self.approval_streak = 0;
                self.rejection_streak += 1;
                (severity, severity_multiplier) =
                    severity_for(event, &config.review_severity_multipliers);
                streak_multiplier = rejection_streak_multiplier(
                    self.rejection_streak,
                    config.rejection_streak_penalty,
                    config.rejection_streak_cap,
                );

                let points = -config.base_points.reject
                    * severity_multiplier
                    * recency
                    * complexity_multiplier
                    * category_multiplier
                    * streak_multiplier;
                (points, points)
            }
            EventType::Close => {
                self.approval_streak = 0;
                self.rejection_streak = 0;
                let points = -config.base_points.close * recency;
                (points, points)
            }
            EventType::SelfClose => (0.0, 0.0),
        };

        self.score += capped_points;
        if capped_points > 0.0 {
            self.positive_points += capped_points;
        } else if capped_points < 0.0 {
            self.negative_points += capped_points;
        }

        self.diagnostics.push(EventDiagnostic {
            index,
            event_type: event.event_type,
            timestamp: event.timestamp,
            pr_number: event.pr_number,
            days_since,
            recency_weight: recency,
            complexity,
            complexity_multiplier,
            category,
            category_multiplier,
            severity,
            severity_multiplier,
            streak_multiplier,
            diminishing_multiplier: diminishing,
            velocity_multiplier: velocity,
            velocity_hit,
            window_count: window,
            raw_points,
            capped_points,
            daily_cap_clipped: clipped,
        });
    }
}

/// Whole and fractional days from `from_ms` to `to_ms`, never negative.
fn days_between(from_ms: i64, to_ms: i64) -> f64 {
    ((to_ms as f64 - from_ms as f64) / MS_PER_DAY).max(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_day(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("{timestamp_ms}ms"))
}
