//! Process-wide counters for trust scoring.
//!
//! Counters are bumped silently by the ledger. Call [`Metrics::flush`] to emit
//! current values as one `tracing::info!` event, e.g. at the end of a CLI run.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Atomic counters; no allocation or locking.
pub struct Metrics {
    contributors_scored: AtomicU64,
    events_replayed: AtomicU64,
    events_appended: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            contributors_scored: AtomicU64::new(0),
            events_replayed: AtomicU64::new(0),
            events_appended: AtomicU64::new(0),
        }
    }

    /// Record one scoring call that replayed `events` events.
    pub fn record_scored(&self, events: usize) {
        self.contributors_scored.fetch_add(1, Ordering::Relaxed);
        self.events_replayed
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn inc_events_appended(&self) {
        self.events_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            contributors_scored = self.contributors_scored(),
            events_replayed = self.events_replayed(),
            events_appended = self.events_appended(),
        );
    }

    pub fn contributors_scored(&self) -> u64 {
        self.contributors_scored.load(Ordering::Relaxed)
    }

    pub fn events_replayed(&self) -> u64 {
        self.events_replayed.load(Ordering::Relaxed)
    }

    pub fn events_appended(&self) -> u64 {
        self.events_appended.load(Ordering::Relaxed)
    }
}
