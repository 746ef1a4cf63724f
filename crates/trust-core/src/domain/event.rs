//! Normalized review events and their vocabularies.

use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Outcome of a review on a contributor's pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    /// Review approved the change.
    Approve,
    /// Review requested changes.
    Reject,
    /// Pull request closed (or review dismissed) by someone else.
    Close,
    /// Contributor closed their own pull request. Scored as zero.
    SelfClose,
}

impl EventType {
    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Close => "close",
            Self::SelfClose => "selfClose",
        }
    }

    /// Parse a loosely spelled type name. Case-insensitive; `self_close` and
    /// `self-close` are accepted for `selfClose`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "close" => Some(Self::Close),
            "selfclose" | "self_close" | "self-close" => Some(Self::SelfClose),
            _ => None,
        }
    }

    /// Single-letter code used by the compact codec.
    pub fn compact_code(self) -> &'static str {
        match self {
            Self::Approve => "a",
            Self::Reject => "r",
            Self::Close => "c",
            Self::SelfClose => "s",
        }
    }

    pub fn from_compact_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::Approve),
            "r" => Some(Self::Reject),
            "c" => Some(Self::Close),
            "s" => Some(Self::SelfClose),
            _ => None,
        }
    }

    /// Whether the event occupies a slot in the rolling velocity window.
    pub fn counts_toward_velocity(self) -> bool {
        !matches!(self, Self::SelfClose)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer-assigned severity of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSeverity {
    Critical,
    Major,
    Normal,
    Minor,
    Trivial,
}

impl ReviewSeverity {
    pub const ALL: [ReviewSeverity; 5] = [
        Self::Critical,
        Self::Major,
        Self::Normal,
        Self::Minor,
        Self::Trivial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Infer a severity from PR labels.
    ///
    /// The first label naming a severity wins, optionally behind a
    /// `severity:`, `severity/`, `severity-` or `sev:` prefix.
    pub fn infer_from_labels(labels: &[String]) -> Option<Self> {
        labels.iter().find_map(|label| {
            let bare = ["severity:", "severity/", "severity-", "sev:"]
                .iter()
                .find_map(|prefix| label.strip_prefix(*prefix))
                .unwrap_or(label.as_str());
            Self::parse(bare)
        })
    }
}

impl std::fmt::Display for ReviewSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated review event.
///
/// # Invariants
///
/// `labels` are lowercase, trimmed and non-empty, in their original order
/// (duplicates are kept). Build events through `normalize_event` or the
/// builder methods below, which both uphold this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub lines_changed: u64,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_severity: Option<ReviewSeverity>,
}

impl Event {
    pub fn new(event_type: EventType, timestamp: i64) -> Self {
        Self {
            event_type,
            timestamp,
            lines_changed: 0,
            labels: Vec::new(),
            pr_number: None,
            review_severity: None,
        }
    }

    pub fn with_lines(mut self, lines_changed: u64) -> Self {
        self.lines_changed = lines_changed;
        self
    }

    /// Set labels, canonicalizing them the same way the normalizer does.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels = crate::normalize::normalize_labels(labels);
        self
    }

    pub fn with_pr(mut self, pr_number: u64) -> Self {
        self.pr_number = Some(pr_number);
        self
    }

    pub fn with_severity(mut self, severity: ReviewSeverity) -> Self {
        self.review_severity = Some(severity);
        self
    }

    /// UTC calendar day index (days since the Unix epoch).
    pub fn utc_day(&self) -> i64 {
        self.timestamp.div_euclid(MS_PER_DAY as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse_aliases() {
        assert_eq!(EventType::parse("Approve"), Some(EventType::Approve));
        assert_eq!(EventType::parse(" reject "), Some(EventType::Reject));
        assert_eq!(EventType::parse("selfClose"), Some(EventType::SelfClose));
        assert_eq!(EventType::parse("self_close"), Some(EventType::SelfClose));
        assert_eq!(EventType::parse("merge"), None);
    }

    #[test]
    fn test_event_type_serde_names() {
        let json = serde_json::to_string(&EventType::SelfClose).unwrap();
        assert_eq!(json, "\"selfClose\"");
        let back: EventType = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(back, EventType::Approve);
    }

    #[test]
    fn test_compact_codes_are_bijective() {
        for t in [
            EventType::Approve,
            EventType::Reject,
            EventType::Close,
            EventType::SelfClose,
        ] {
            assert_eq!(EventType::from_compact_code(t.compact_code()), Some(t));
        }
        assert_eq!(EventType::from_compact_code("x"), None);
    }

    #[test]
    fn test_infer_severity_from_labels() {
        let labels = vec!["bugfix".to_string(), "severity:major".to_string()];
        assert_eq!(
            ReviewSeverity::infer_from_labels(&labels),
            Some(ReviewSeverity::Major)
        );

        let labels = vec!["trivial".to_string(), "critical".to_string()];
        assert_eq!(
            ReviewSeverity::infer_from_labels(&labels),
            Some(ReviewSeverity::Trivial)
        );

        let labels = vec!["docs".to_string()];
        assert_eq!(ReviewSeverity::infer_from_labels(&labels), None);
    }

    #[test]
    fn test_utc_day_handles_pre_epoch() {
        let e = Event::new(EventType::Approve, -1);
        assert_eq!(e.utc_day(), -1);
        let e = Event::new(EventType::Approve, 86_400_000);
        assert_eq!(e.utc_day(), 1);
    }

    #[test]
    fn test_builder_canonicalizes_labels() {
        let e = Event::new(EventType::Approve, 0).with_labels(["  Bugfix", "", "DOCS", "docs"]);
        assert_eq!(e.labels, vec!["bugfix", "docs", "docs"]);
    }
}
