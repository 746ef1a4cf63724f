//! Store-backed scoring facade.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::ScoringConfig;
use crate::domain::{ContributorState, Event, Result, TrustError};
use crate::engine::{score_contributor, ScoreResult};
use crate::metrics::METRICS;
use crate::obs::{self, ContributorSpan};
use crate::store::StateStore;

/// Couples a [`StateStore`] with a resolved [`ScoringConfig`].
pub struct TrustLedger<S> {
    store: S,
    config: ScoringConfig,
}

impl<S: StateStore> TrustLedger<S> {
    pub fn new(store: S, config: ScoringConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Score one stored contributor as of `now`.
    ///
    /// # Errors
    ///
    /// `TrustError::ContributorNotFound` when the store has no state for
    /// `contributor`.
    pub fn score(&self, contributor: &str, now: DateTime<Utc>) -> Result<ScoreResult> {
        let _span = ContributorSpan::enter(contributor);
        let state = self
            .store
            .load(contributor)?
            .ok_or_else(|| TrustError::ContributorNotFound(contributor.to_string()))?;
        Ok(self.score_state(&state, now))
    }

    /// Score every stored contributor, keyed (and therefore sorted) by id.
    pub fn score_all(&self, now: DateTime<Utc>) -> Result<BTreeMap<String, ScoreResult>> {
        let mut results = BTreeMap::new();
        for id in self.store.contributor_ids()? {
            let _span = ContributorSpan::enter(&id);
            if let Some(state) = self.store.load(&id)? {
                results.insert(id, self.score_state(&state, now));
            }
        }
        Ok(results)
    }

    /// Append `event` to the contributor's log.
    ///
    /// A contributor with no stored state is created with `createdAt` set to
    /// the event's timestamp. With `persist == false` the updated state is
    /// returned without touching the store.
    pub fn append_event(
        &self,
        contributor: &str,
        event: Event,
        persist: bool,
    ) -> Result<ContributorState> {
        let _span = ContributorSpan::enter(contributor);
        let state = match self.store.load(contributor)? {
            Some(state) => state,
            None => ContributorState::new(contributor, event.timestamp)?,
        };
        let kind = event.event_type;
        let state = state.with_event(event);

        if persist {
            self.store.save(&state)?;
        }
        METRICS.inc_events_appended();
        obs::emit_event_appended(contributor, kind.as_str(), state.events.len(), persist);
        Ok(state)
    }

    fn score_state(&self, state: &ContributorState, now: DateTime<Utc>) -> ScoreResult {
        let result = score_contributor(state, &self.config, now);
        METRICS.record_scored(state.events.len());
        obs::emit_contributor_scored(
            &state.contributor,
            result.score,
            &result.tier,
            state.events.len(),
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventType;
    use crate::store::MemoryStateStore;

    const DAY_MS: i64 = 86_400_000;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(100 * DAY_MS).unwrap()
    }

    #[test]
    fn test_score_missing_contributor() {
        let ledger = TrustLedger::new(MemoryStateStore::new(), ScoringConfig::default());
        let err = ledger.score("ghost", now()).unwrap_err();
        assert!(matches!(err, TrustError::ContributorNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_append_creates_state_at_first_event() {
        let ledger = TrustLedger::new(MemoryStateStore::new(), ScoringConfig::default());
        let ts = 99 * DAY_MS;
        let state = ledger
            .append_event("octocat", Event::new(EventType::Approve, ts), true)
            .unwrap();
        assert_eq!(state.created_at, ts);
        assert_eq!(state.events.len(), 1);
        assert!(ledger.store().load("octocat").unwrap().is_some());
    }

    #[test]
    fn test_dry_run_append_does_not_persist() {
        let ledger = TrustLedger::new(MemoryStateStore::new(), ScoringConfig::default());
        let state = ledger
            .append_event("octocat", Event::new(EventType::Reject, DAY_MS), false)
            .unwrap();
        assert_eq!(state.events.len(), 1);
        assert!(ledger.store().load("octocat").unwrap().is_none());
    }

    #[test]
    fn test_append_blank_contributor_rejected() {
        let ledger = TrustLedger::new(MemoryStateStore::new(), ScoringConfig::default());
        let err = ledger
            .append_event("  ", Event::new(EventType::Approve, DAY_MS), true)
            .unwrap_err();
        assert!(matches!(err, TrustError::Validation(_)));
    }
}
