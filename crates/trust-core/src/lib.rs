//! Contributor Trust Core Library
//!
//! Replays a contributor's pull-request review history into a 0–100 trust
//! score and a named tier. Re-exports the scoring entry points, the
//! configuration layer and the store/ledger seam.

pub mod codec;
pub mod config;
pub mod domain;
pub mod engine;
pub mod gate;
pub mod ledger;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod store;
pub mod telemetry;
pub mod tier;
pub mod webhook;

pub use codec::{
    from_compact_event, from_compact_state, to_compact_event, to_compact_state, CompactEvent,
    CompactState,
};

pub use config::{
    with_config, BasePoints, ComplexityBucket, ConfigOverrides, InactivityConfig, ScoringConfig,
    VelocityConfig,
};

pub use domain::{
    ContributorState, Event, EventType, Result, ReviewSeverity, TrustError, ValidationError,
};

pub use engine::{
    score_contributor, score_contributor_at, Breakdown, EventDiagnostic, ScoreResult, VelocityHit,
};

pub use gate::{evaluate_privilege, PrivilegeRule, PrivilegeRuleSet, PrivilegeVerdict};

pub use ledger::TrustLedger;

pub use normalize::{normalize_event, RawEvent, RawTimestamp};

pub use store::{MemoryStateStore, StateDocument, StateStore};

pub use tier::{default_tiers, get_tier_info, TierDefinition};

pub use webhook::{normalize_review_payload, ReviewEvent, ReviewWebhook};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
