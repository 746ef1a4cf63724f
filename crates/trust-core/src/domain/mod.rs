//! Domain models for contributor trust scoring.
//!
//! Canonical definitions for the core entities:
//! - `Event`: A normalized review outcome
//! - `ContributorState`: The append-only event log of one contributor

pub mod error;
pub mod event;
pub mod state;

pub use error::{Result, TrustError, ValidationError};
pub use event::{Event, EventType, ReviewSeverity, MS_PER_DAY};
pub use state::ContributorState;
