//! Sparse short-keyed wire encoding for persisted contributor state.
//!
//! Scoring never sees these types: documents are expanded into domain values
//! on read and compacted on write.
//!
//! | Expanded           | Compact |
//! |--------------------|---------|
//! | `contributor`      | `c`     |
//! | `createdAt`        | `t`     |
//! | `manualAdjustment` | `m`     |
//! | `events`           | `e`     |
//! | `type`             | `y`     |
//! | `timestamp`        | `ts`    |
//! | `linesChanged`     | `l`     |
//! | `labels`           | `lb`    |
//! | `prNumber`         | `p`     |
//! | `reviewSeverity`   | `rv`    |

use serde::{Deserialize, Serialize};

use crate::domain::{ContributorState, Event, EventType, ReviewSeverity, ValidationError};
use crate::normalize::normalize_labels;

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_f64(v: &f64) -> bool {
    *v == 0.0
}

/// Compact form of [`Event`]. Defaulted fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactEvent {
    pub y: String,
    pub ts: i64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub l: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lb: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rv: Option<String>,
}

/// Compact form of [`ContributorState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactState {
    pub c: String,
    pub t: i64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub m: f64,
    #[serde(default)]
    pub e: Vec<CompactEvent>,
}

pub fn to_compact_event(event: &Event) -> CompactEvent {
    CompactEvent {
        y: event.event_type.compact_code().to_string(),
        ts: event.timestamp,
        l: event.lines_changed,
        lb: event.labels.clone(),
        p: event.pr_number,
        rv: event.review_severity.map(|s| s.as_str().to_string()),
    }
}

/// Expand a compact event.
///
/// # Errors
///
/// `ValidationError::UnknownCompactCode` when `y` is not a known type code.
pub fn from_compact_event(compact: &CompactEvent) -> Result<Event, ValidationError> {
    let event_type =
        EventType::from_compact_code(&compact.y).ok_or_else(|| {
            ValidationError::UnknownCompactCode {
                code: compact.y.clone(),
            }
        })?;

    Ok(Event {
        event_type,
        timestamp: compact.ts,
        lines_changed: compact.l,
        labels: normalize_labels(&compact.lb),
        pr_number: compact.p,
        review_severity: compact.rv.as_deref().and_then(ReviewSeverity::parse),
    })
}

pub fn to_compact_state(state: &ContributorState) -> CompactState {
    CompactState {
        c: state.contributor.clone(),
        t: state.created_at,
        m: state.manual_adjustment,
        e: state.events.iter().map(to_compact_event).collect(),
    }
}

/// Expand a compact state document, failing on the first undecodable event.
pub fn from_compact_state(compact: &CompactState) -> Result<ContributorState, ValidationError> {
    let events = compact
        .e
        .iter()
        .map(from_compact_event)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ContributorState {
        contributor: compact.c.clone(),
        created_at: compact.t,
        manual_adjustment: compact.m,
        events,
    })
}
