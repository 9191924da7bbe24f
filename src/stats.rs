//! Processor Statistics Module
//!
//! Counts what the epoch adjuster did with each span.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::epoch::Outcome;

// == Processor Stats ==
/// Live outcome counters, safe to update from concurrent batches.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    spans: AtomicU64,
    accepted: AtomicU64,
    corrected: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time copy of [`ProcessorStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Spans seen
    pub spans: u64,
    /// Spans whose identifier was already inside the window
    pub accepted: u64,
    /// Spans whose identifier got an agreed epoch
    pub corrected: u64,
    /// Spans left unchanged after a cache or decode failure
    pub skipped: u64,
}

impl ProcessorStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Counts one processed span.
    pub fn record(&self, outcome: Outcome) {
        self.spans.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::Accepted => &self.accepted,
            Outcome::Corrected => &self.corrected,
            Outcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            spans: self.spans.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            corrected: self.corrected.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    // == Skip Rate ==
    /// Share of out-of-window spans whose correction was abandoned.
    ///
    /// Returns 0.0 when no span needed correcting.
    pub fn skip_rate(&self) -> f64 {
        let attempted = self.corrected + self.skipped;
        if attempted == 0 {
            0.0
        } else {
            self.skipped as f64 / attempted as f64
        }
    }
}
