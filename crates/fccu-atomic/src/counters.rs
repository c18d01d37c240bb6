//! Atomic fault statistics counters.
//!
//! This module provides [`FaultCounters`], the monitoring counters of the
//! fault collector. All increments use `Ordering::Relaxed`: the counters are
//! observability data and take no part in synchronizing the event queue
//! itself.
//!
//! # RT Safety
//!
//! All `record_*` methods are single atomic fetch-add instructions. No heap
//! allocation, no blocking, no syscalls.

use portable_atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of per-priority counter lanes.
///
/// Fixed at four regardless of the configured queue level count; levels
/// beyond the lanes still count into the totals.
pub const PRIORITY_LANES: usize = 4;

/// Counter snapshot returned by [`FaultCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaultStatistics {
    /// Reports admitted into the queue set.
    pub total_reported: u64,
    /// Entries consumed and dispatched by the drain path.
    pub total_processed: u64,
    /// Reports rejected by admission or a full ring, plus escalation
    /// re-enqueues that found the target ring full.
    pub total_dropped: u64,
    /// Admitted reports per priority lane.
    pub priority_reported: [u64; PRIORITY_LANES],
    /// Dropped reports per priority lane.
    pub priority_dropped: [u64; PRIORITY_LANES],
}

/// Atomic fault statistics counters.
///
/// # Thread Safety
///
/// Every counter is an `AtomicU64` with relaxed semantics: values are
/// eventually consistent and individual increments are not atomic as a
/// group. A snapshot taken while both sides are running may mix counts from
/// adjacent operations; totals still never under-count.
#[derive(Debug)]
pub struct FaultCounters {
    total_reported: AtomicU64,
    total_processed: AtomicU64,
    total_dropped: AtomicU64,
    reported: [AtomicU64; PRIORITY_LANES],
    dropped: [AtomicU64; PRIORITY_LANES],
}

impl FaultCounters {
    /// Create counters initialized to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_reported: AtomicU64::new(0),
            total_processed: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            reported: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
            dropped: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
        }
    }

    /// Record an admitted report at the given level.
    #[inline]
    pub fn record_reported(&self, level: u8) {
        self.total_reported.fetch_add(1, Ordering::Relaxed);
        if let Some(lane) = self.reported.get(usize::from(level)) {
            lane.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a processed entry.
    #[inline]
    pub fn record_processed(&self) {
        self.total_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped report at the given level.
    #[inline]
    pub fn record_dropped(&self, level: u8) {
        self.total_dropped.fetch_add(1, Ordering::Relaxed);
        if let Some(lane) = self.dropped.get(usize::from(level)) {
            lane.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an escalation re-enqueue lost to a full ring.
    ///
    /// Counts into the dropped total only; the entry was already attributed
    /// to its original lane when first reported.
    #[inline]
    pub fn record_requeue_dropped(&self) {
        self.total_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> FaultStatistics {
        let mut stats = FaultStatistics {
            total_reported: self.total_reported.load(Ordering::Relaxed),
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_dropped: self.total_dropped.load(Ordering::Relaxed),
            ..FaultStatistics::default()
        };
        for (lane, counter) in stats.priority_reported.iter_mut().zip(&self.reported) {
            *lane = counter.load(Ordering::Relaxed);
        }
        for (lane, counter) in stats.priority_dropped.iter_mut().zip(&self.dropped) {
            *lane = counter.load(Ordering::Relaxed);
        }
        stats
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.total_reported.store(0, Ordering::Relaxed);
        self.total_processed.store(0, Ordering::Relaxed);
        self.total_dropped.store(0, Ordering::Relaxed);
        for lane in &self.reported {
            lane.store(0, Ordering::Relaxed);
        }
        for lane in &self.dropped {
            lane.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for FaultCounters {
    fn default() -> Self {
        Self::new()
    }
}
