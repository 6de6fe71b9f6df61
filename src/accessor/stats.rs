//! Accessor Statistics Module
//!
//! Lock-free counters describing how reads were served.

use std::sync::atomic::{AtomicU64, Ordering};

// == Accessor Stats ==
/// Live counters shared by all in-flight accessor calls.
#[derive(Debug, Default)]
pub struct AccessorStats {
    hits: AtomicU64,
    misses: AtomicU64,
    unavailable: AtomicU64,
    store_reads: AtomicU64,
    invalidations: AtomicU64,
}

impl AccessorStats {
    /// Creates a new AccessorStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_read(&self) {
        self.store_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            store_reads: self.store_reads.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of [`AccessorStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub unavailable: u64,
    pub store_reads: u64,
    pub invalidations: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits over all lookups, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.unavailable;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
