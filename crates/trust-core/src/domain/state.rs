//! Per-contributor event log.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::event::Event;

/// Everything the engine knows about one contributor.
///
/// Append-only: events are never edited or removed. Mutating helpers consume
/// `self` and hand back the new value, so a shared state is never changed in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorState {
    pub contributor: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Human-applied additive correction to the baseline score.
    #[serde(default)]
    pub manual_adjustment: f64,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl ContributorState {
    pub fn new(contributor: impl Into<String>, created_at: i64) -> Result<Self, ValidationError> {
        let contributor = contributor.into();
        if contributor.trim().is_empty() {
            return Err(ValidationError::EmptyContributor);
        }
        Ok(Self {
            contributor,
            created_at,
            manual_adjustment: 0.0,
            events: Vec::new(),
        })
    }

    /// Return a new state with `event` appended.
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_manual_adjustment(mut self, adjustment: f64) -> Self {
        self.manual_adjustment = adjustment;
        self
    }

    /// Latest event timestamp, if any events were recorded.
    pub fn last_event_at(&self) -> Option<i64> {
        self.events.iter().map(|e| e.timestamp).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventType;

    #[test]
    fn test_new_rejects_blank_contributor() {
        assert_eq!(
            ContributorState::new("  ", 0).unwrap_err(),
            ValidationError::EmptyContributor
        );
    }

    #[test]
    fn test_with_event_appends_without_touching_original() {
        let base = ContributorState::new("octocat", 1_000).unwrap();
        let next = base
            .clone()
            .with_event(Event::new(EventType::Approve, 2_000));
        assert!(base.events.is_empty());
        assert_eq!(next.events.len(), 1);
        assert_eq!(next.last_event_at(), Some(2_000));
    }

    #[test]
    fn test_last_event_at_uses_max_not_last() {
        let state = ContributorState::new("octocat", 0)
            .unwrap()
            .with_event(Event::new(EventType::Approve, 5_000))
            .with_event(Event::new(EventType::Reject, 3_000));
        assert_eq!(state.last_event_at(), Some(5_000));
    }

    #[test]
    fn test_expanded_serde_defaults() {
        let json = r#"{"contributor":"octocat","createdAt":42}"#;
        let state: ContributorState = serde_json::from_str(json).unwrap();
        assert_eq!(state.manual_adjustment, 0.0);
        assert!(state.events.is_empty());
    }
}
