//! Structured observability hooks for trust scoring.
//!
//! This module provides:
//! - Contributor-scoped tracing spans via the `ContributorSpan` RAII guard
//! - Emission functions for scoring lifecycle events
//!
//! Lifecycle events are emitted at `info!`; per-event throttling notices
//! at `debug!` since a single replay can produce many of them.

use tracing::{debug, info, warn};

/// RAII guard that enters a contributor-scoped span.
///
/// # Example
///
/// ```ignore
/// let _span = ContributorSpan::enter("octocat");
/// // tracing calls here carry contributor = "octocat"
/// ```
pub struct ContributorSpan {
    _span: tracing::span::EnteredSpan,
}

impl ContributorSpan {
    pub fn enter(contributor: &str) -> Self {
        let span = tracing::info_span!("trust.contributor", contributor = %contributor);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a contributor was scored.
pub fn emit_contributor_scored(contributor: &str, score: f64, tier: &str, events: usize) {
    info!(
        event = "contributor.scored",
        contributor = %contributor,
        score = score,
        tier = %tier,
        events = events,
    );
}

/// Emit event: an event was appended to a contributor's log.
pub fn emit_event_appended(contributor: &str, event_type: &str, total_events: usize, persisted: bool) {
    info!(
        event = "event.appended",
        contributor = %contributor,
        kind = %event_type,
        total_events = total_events,
        persisted = persisted,
    );
}

/// Emit event: a state document was loaded.
pub fn emit_state_loaded(contributors: usize) {
    info!(event = "state.loaded", contributors = contributors);
}

/// Emit event: an event exceeded the velocity hard cap.
pub fn emit_velocity_hard_cap(timestamp: i64, window_count: usize, hard_cap: u32) {
    debug!(
        event = "velocity.hard_cap",
        timestamp = timestamp,
        window_count = window_count,
        hard_cap = hard_cap,
    );
}

/// Emit event: approval points were clipped by the daily cap.
pub fn emit_daily_cap_clipped(timestamp: i64, requested: f64, granted: f64) {
    debug!(
        event = "daily_cap.clipped",
        timestamp = timestamp,
        requested = requested,
        granted = granted,
    );
}

/// Emit event: a privilege gate blocked a contributor (warning level).
pub fn emit_privilege_blocked(contributor: &str, violations: usize) {
    warn!(
        event = "privilege.blocked",
        contributor = %contributor,
        violations = violations,
    );
}
