//! Event normalization.
//!
//! Turns a loosely-typed [`RawEvent`] (as received from a webhook adapter or a
//! hand-edited state file) into a validated [`Event`]. Only the event type and
//! timestamp can fail; every other field is coerced to a safe default.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Event, EventType, ReviewSeverity, ValidationError};

/// Timestamp as it may appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch milliseconds.
    Millis(f64),
    /// Numeric string or RFC 3339 date-time.
    Text(String),
}

/// Unvalidated event input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, alias = "lines_changed")]
    pub lines_changed: Option<Value>,
    /// Non-string entries are dropped; `null` means no labels.
    #[serde(default)]
    pub labels: Option<Vec<Value>>,
    #[serde(default, alias = "pr_number")]
    pub pr_number: Option<Value>,
    #[serde(default, alias = "review_severity")]
    pub review_severity: Option<String>,
}

impl RawEvent {
    pub fn new(kind: impl Into<String>, timestamp_ms: f64) -> Self {
        Self {
            kind: Some(kind.into()),
            timestamp: Some(RawTimestamp::Millis(timestamp_ms)),
            ..Self::default()
        }
    }
}

/// Validate and canonicalize one raw event.
///
/// # Errors
///
/// - `ValidationError::EmptyEventType`: no type was supplied.
/// - `ValidationError::UnknownEventType`: the type is not one of
///   `approve`, `reject`, `close`, `selfClose`.
/// - `ValidationError::InvalidTimestamp`: the timestamp is missing,
///   non-finite, or unparseable.
pub fn normalize_event(raw: RawEvent) -> Result<Event, ValidationError> {
    let kind = raw.kind.unwrap_or_default();
    if kind.trim().is_empty() {
        return Err(ValidationError::EmptyEventType);
    }
    let event_type =
        EventType::parse(&kind).ok_or(ValidationError::UnknownEventType { kind })?;

    let timestamp = normalize_timestamp(raw.timestamp.as_ref())?;

    Ok(Event {
        event_type,
        timestamp,
        lines_changed: coerce_lines(raw.lines_changed.as_ref()),
        labels: normalize_labels(raw.labels.iter().flatten().filter_map(Value::as_str)),
        pr_number: raw.pr_number.as_ref().and_then(coerce_pr_number),
        review_severity: raw
            .review_severity
            .as_deref()
            .and_then(ReviewSeverity::parse),
    })
}

/// Lowercase and trim labels, dropping empties. Order and duplicates are kept.
pub fn normalize_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .map(|l| l.as_ref().trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

fn normalize_timestamp(raw: Option<&RawTimestamp>) -> Result<i64, ValidationError> {
    let millis = match raw {
        None => {
            return Err(ValidationError::InvalidTimestamp {
                value: "missing".to_string(),
            })
        }
        Some(RawTimestamp::Millis(ms)) => *ms,
        Some(RawTimestamp::Text(text)) => {
            let text = text.trim();
            match text.parse::<f64>() {
                Ok(ms) => ms,
                Err(_) => DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.timestamp_millis() as f64)
                    .map_err(|_| ValidationError::InvalidTimestamp {
                        value: text.to_string(),
                    })?,
            }
        }
    };

    if !millis.is_finite() {
        return Err(ValidationError::InvalidTimestamp {
            value: millis.to_string(),
        });
    }
    Ok(millis.trunc() as i64)
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_lines(value: Option<&Value>) -> u64 {
    match value.and_then(coerce_number) {
        Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        _ => 0,
    }
}

fn coerce_pr_number(value: &Value) -> Option<u64> {
    let n = match value {
        Value::String(s) => s.trim().trim_start_matches('#').parse::<f64>().ok()?,
        other => coerce_number(other)?,
    };
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0).then(|| n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type_rejected() {
        let err = normalize_event(RawEvent::new("merge", 1.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownEventType {
                kind: "merge".to_string()
            }
        );
    }

    #[test]
    fn test_missing_type_rejected() {
        let raw = RawEvent {
            timestamp: Some(RawTimestamp::Millis(1.0)),
            ..RawEvent::default()
        };
        assert_eq!(
            normalize_event(raw).unwrap_err(),
            ValidationError::EmptyEventType
        );
    }

    #[test]
    fn test_non_finite_timestamp_rejected() {
        for ts in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = normalize_event(RawEvent::new("approve", ts)).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidTimestamp { .. }));
        }
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let raw = RawEvent {
            kind: Some("approve".to_string()),
            ..RawEvent::default()
        };
        assert!(matches!(
            normalize_event(raw).unwrap_err(),
            ValidationError::InvalidTimestamp { .. }
        ));
    }

    #[test]
    fn test_rfc3339_and_numeric_string_timestamps() {
        let raw = RawEvent {
            kind: Some("approve".to_string()),
            timestamp: Some(RawTimestamp::Text("2024-01-02T00:00:00Z".to_string())),
            ..RawEvent::default()
        };
        assert_eq!(normalize_event(raw).unwrap().timestamp, 1_704_153_600_000);

        let raw = RawEvent {
            kind: Some("approve".to_string()),
            timestamp: Some(RawTimestamp::Text(" 1700000000000 ".to_string())),
            ..RawEvent::default()
        };
        assert_eq!(normalize_event(raw).unwrap().timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_lines_changed_coercion() {
        let cases = [
            (json!(-5), 0),
            (json!(12.9), 12),
            (json!("40"), 40),
            (json!(null), 0),
            (json!("lots"), 0),
        ];
        for (input, expected) in cases {
            let mut raw = RawEvent::new("approve", 0.0);
            raw.lines_changed = Some(input.clone());
            assert_eq!(
                normalize_event(raw).unwrap().lines_changed,
                expected,
                "input {input}"
            );
        }
    }

    #[test]
    fn test_labels_lowercased_trimmed_not_deduplicated() {
        let mut raw = RawEvent::new("approve", 0.0);
        raw.labels = Some(vec![
            json!(" Security "),
            json!(""),
            json!("   "),
            json!(3),
            json!("docs"),
            json!("DOCS"),
        ]);
        let event = normalize_event(raw).unwrap();
        assert_eq!(event.labels, vec!["security", "docs", "docs"]);
    }

    #[test]
    fn test_pr_number_and_severity_coercion() {
        let mut raw = RawEvent::new("reject", 0.0);
        raw.pr_number = Some(json!("#42"));
        raw.review_severity = Some(" Major ".to_string());
        let event = normalize_event(raw).unwrap();
        assert_eq!(event.pr_number, Some(42));
        assert_eq!(event.review_severity, Some(ReviewSeverity::Major));

        let mut raw = RawEvent::new("reject", 0.0);
        raw.pr_number = Some(json!(1.5));
        raw.review_severity = Some("blocker".to_string());
        let event = normalize_event(raw).unwrap();
        assert_eq!(event.pr_number, None);
        assert_eq!(event.review_severity, None);
    }

    #[test]
    fn test_raw_event_deserializes_loose_json() {
        let raw: RawEvent = serde_json::from_value(json!({
            "type": "selfClose",
            "timestamp": 1700000000000u64,
            "lines_changed": "7",
            "labels": ["Chore"],
            "prNumber": 9
        }))
        .unwrap();
        let event = normalize_event(raw).unwrap();
        assert_eq!(event.event_type, EventType::SelfClose);
        assert_eq!(event.timestamp, 1_700_000_000_000);
        assert_eq!(event.lines_changed, 7);
        assert_eq!(event.labels, vec!["chore"]);
        assert_eq!(event.pr_number, Some(9));
    }
}
