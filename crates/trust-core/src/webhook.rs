//! Pull-request review webhook adapter.
//!
//! Maps a review payload onto a contributor id plus a validated [`Event`].
//! Only the fields scoring needs are read; everything else in the payload is
//! ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Event, ReviewSeverity, ValidationError};
use crate::normalize::{normalize_event, RawEvent, RawTimestamp};

/// Review webhook payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewWebhook {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub review: Review,
    #[serde(default)]
    pub pull_request: PullRequest,
    /// Explicit severity; when absent it is inferred from the PR labels.
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub labels: Vec<PullRequestLabel>,
    #[serde(default)]
    pub user: Option<PullRequestUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestLabel {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestUser {
    pub login: String,
}

/// A webhook resolved to the contributor it scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEvent {
    pub contributor: String,
    pub event: Event,
}

/// Event type for a review state.
///
/// `approved` → `approve`, `changes_requested` → `reject`, `dismissed` →
/// `close`; anything else (comments, pending reviews) is a `selfClose`,
/// which records activity but scores nothing.
pub fn event_type_for_review_state(state: &str) -> &'static str {
    match state.trim().to_lowercase().as_str() {
        "approved" => "approve",
        "changes_requested" => "reject",
        "dismissed" => "close",
        _ => "selfClose",
    }
}

/// Normalize a review webhook.
///
/// The PR author is the contributor. `linesChanged` is additions plus
/// deletions. A missing `submitted_at` falls back to `received_at`.
///
/// # Errors
///
/// - `ValidationError::EmptyContributor` when the PR has no author login.
/// - `ValidationError::InvalidTimestamp` when `submitted_at` is unparseable.
pub fn normalize_review_payload(
    payload: &ReviewWebhook,
    received_at: DateTime<Utc>,
) -> Result<ReviewEvent, ValidationError> {
    let contributor = payload
        .pull_request
        .user
        .as_ref()
        .map(|u| u.login.trim())
        .filter(|login| !login.is_empty())
        .ok_or(ValidationError::EmptyContributor)?
        .to_string();

    let timestamp = match payload.review.submitted_at.as_deref() {
        Some(submitted) if !submitted.trim().is_empty() => {
            RawTimestamp::Text(submitted.to_string())
        }
        _ => RawTimestamp::Millis(received_at.timestamp_millis() as f64),
    };

    let pr = &payload.pull_request;
    let raw = RawEvent {
        kind: Some(event_type_for_review_state(&payload.review.state).to_string()),
        timestamp: Some(timestamp),
        lines_changed: Some(Value::from(pr.additions.saturating_add(pr.deletions))),
        labels: Some(pr.labels.iter().map(|l| Value::from(l.name.as_str())).collect()),
        pr_number: pr.number.map(Value::from),
        review_severity: payload.severity.clone(),
    };

    let mut event = normalize_event(raw)?;
    if event.review_severity.is_none() {
        event.review_severity = ReviewSeverity::infer_from_labels(&event.labels);
    }

    Ok(ReviewEvent { contributor, event })
}
