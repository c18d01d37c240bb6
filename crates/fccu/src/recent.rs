//! Recent-fault overwrite ring.
//!
//! A fixed 16-slot ring of the most recently processed events, oldest slot
//! overwritten, retained count saturating at the ring size. Written by the
//! consumer during processing; enumerated newest-first.
//!
//! # SPSC Contract
//!
//! Slot writes and enumeration must both happen on the consumer side, the
//! same discipline the event ring imposes on `pop`. The head and count
//! words are atomic so producer-side telemetry may read [`RecentRing::len`]
//! at any time.

use core::cell::UnsafeCell;
use core::fmt;

use portable_atomic::{AtomicUsize, Ordering};

use crate::event::RecentFaultInfo;

/// Number of slots in the recent-fault ring.
pub const RECENT_RING_SIZE: usize = 16;

/// Fixed-size overwrite ring of recently processed faults.
pub struct RecentRing {
    slots: [UnsafeCell<RecentFaultInfo>; RECENT_RING_SIZE],
    /// Next write position.
    head: AtomicUsize,
    /// Number of valid slots, saturating at [`RECENT_RING_SIZE`].
    count: AtomicUsize,
}

// Slots are written and read only from the consumer side; the atomic head
// and count words carry the cross-thread observations.
unsafe impl Send for RecentRing {}
unsafe impl Sync for RecentRing {}

impl RecentRing {
    /// Create an empty ring.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| UnsafeCell::new(RecentFaultInfo::default())),
            head: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    /// Record a processed fault, overwriting the oldest slot (consumer
    /// side).
    pub fn record(&self, info: RecentFaultInfo) {
        let head = self.head.load(Ordering::Relaxed);
        // Consumer-exclusive slot access per the ring contract.
        unsafe { *self.slots[head].get() = info };
        self.head
            .store((head + 1) % RECENT_RING_SIZE, Ordering::Relaxed);

        let count = self.count.load(Ordering::Relaxed);
        if count < RECENT_RING_SIZE {
            self.count.store(count + 1, Ordering::Relaxed);
        }
    }

    /// Enumerate retained faults newest-first, up to `max_count` entries
    /// (consumer side).
    pub fn for_each<F: FnMut(&RecentFaultInfo)>(&self, max_count: usize, mut f: F) {
        let head = self.head.load(Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed).min(max_count);
        for i in 0..count {
            let idx = (head + RECENT_RING_SIZE - 1 - i) % RECENT_RING_SIZE;
            // Consumer-exclusive slot access per the ring contract.
            let info = unsafe { *self.slots[idx].get() };
            f(&info);
        }
    }

    /// Number of retained entries (at most [`RECENT_RING_SIZE`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// True when nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecentRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecentRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecentRing")
            .field("len", &self.len())
            .field("capacity", &RECENT_RING_SIZE)
            .finish()
    }
}
