//! Per-fault lifecycle state machine.
//!
//! An individual machine bound to one fault index, tracking detection,
//! confirmation against an error threshold, and recovery. State and
//! occurrence count are atomic, so producer-side `Detected` dispatch and
//! consumer-side `Confirmed`/`ClearFault` dispatch are individually
//! data-race free.
//!
//! # State Transition Diagram
//!
//! ```text
//! Dormant ──Detected──► Detected ──Confirmed──► Active
//!               │  ▲                               │
//!               │  └─Detected (internal, ++count)  ├──RecoveryStart──► Recovering
//!               │                                  │                       │
//!          ClearFault                         ClearFault             RecoveryDone
//!               ▼                                  ▼                       ▼
//!            Cleared ◄─────────────────────────────┴───────────────────Cleared
//!               │
//!          ClearFault (count = 0)
//!               ▼
//!            Dormant
//! ```
//!
//! The `Confirmed` transition is guarded: it fires only once the machine's
//! occurrence count has reached the bound threshold, rejecting spurious
//! early confirmations.

use core::fmt;

use portable_atomic::{AtomicU32, AtomicU8, Ordering};

/// Lifecycle state of an individual fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FaultLifecycle {
    /// Fault not active.
    #[default]
    Dormant = 0,
    /// Fault reported but below threshold.
    Detected = 1,
    /// Fault confirmed (threshold reached).
    Active = 2,
    /// Recovery in progress.
    Recovering = 3,
    /// Fault resolved.
    Cleared = 4,
}

impl FaultLifecycle {
    /// Convert from raw u8 value.
    #[must_use]
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dormant),
            1 => Some(Self::Detected),
            2 => Some(Self::Active),
            3 => Some(Self::Recovering),
            4 => Some(Self::Cleared),
            _ => None,
        }
    }

    /// Convert to raw u8 value.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Get the state as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dormant => "Dormant",
            Self::Detected => "Detected",
            Self::Active => "Active",
            Self::Recovering => "Recovering",
            Self::Cleared => "Cleared",
        }
    }
}

impl fmt::Display for FaultLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events dispatched to a per-fault machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultHsmEvent {
    /// A fault occurrence was admitted.
    Detected,
    /// The occurrence threshold was reached on the consumer side.
    Confirmed,
    /// A recovery attempt was initiated.
    RecoveryStart,
    /// Recovery completed successfully.
    RecoveryDone,
    /// The fault was cleared by a hook, the user, or the system.
    ClearFault,
}

/// Snapshot of a per-fault machine's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerFaultContext {
    /// Bound fault index.
    pub fault_index: u16,
    /// Cumulative occurrence count advanced by `Detected` events.
    pub occurrence_count: u32,
    /// Threshold for the `Detected` to `Active` transition.
    pub err_threshold: u32,
}

/// Per-fault lifecycle state machine with atomic transitions.
///
/// The machine-local occurrence count is advanced by `Detected` events on
/// the producer side; the collector emits `Confirmed` from the consumer
/// side using the fault table's counter. The two counters track different
/// things and may diverge under reporting/processing skew.
#[derive(Debug)]
pub struct PerFaultHsm {
    state: AtomicU8,
    occurrence_count: AtomicU32,
    fault_index: u16,
    err_threshold: u32,
}

impl PerFaultHsm {
    /// Create an unbound machine in the `Dormant` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(FaultLifecycle::Dormant.to_raw()),
            occurrence_count: AtomicU32::new(0),
            fault_index: 0,
            err_threshold: 1,
        }
    }

    /// Bind this machine to a fault index and threshold.
    ///
    /// Resets the machine to `Dormant` and zeroes the occurrence count.
    pub fn bind(&mut self, fault_index: u16, threshold: u32) {
        self.fault_index = fault_index;
        self.err_threshold = threshold;
        self.reset();
    }

    /// Reset to `Dormant` and zero the occurrence count without changing
    /// the binding.
    pub fn reset(&self) {
        self.occurrence_count.store(0, Ordering::Relaxed);
        self.state
            .store(FaultLifecycle::Dormant.to_raw(), Ordering::Release);
    }

    /// Dispatch an event to the state machine.
    ///
    /// Returns true when a transition (or the internal `Detected`
    /// self-transition) fired; false when the current state defines no
    /// transition for the event.
    pub fn dispatch(&self, event: FaultHsmEvent) -> bool {
        match event {
            FaultHsmEvent::Detected => {
                if self.transition(FaultLifecycle::Dormant, FaultLifecycle::Detected) {
                    self.occurrence_count.store(1, Ordering::Relaxed);
                    true
                } else if self.state() == FaultLifecycle::Detected {
                    // Internal transition: stay in Detected, count the
                    // occurrence.
                    self.occurrence_count.fetch_add(1, Ordering::Relaxed);
                    true
                } else {
                    false
                }
            }
            FaultHsmEvent::Confirmed => {
                self.state() == FaultLifecycle::Detected
                    && self.occurrence_count.load(Ordering::Relaxed) >= self.err_threshold
                    && self.transition(FaultLifecycle::Detected, FaultLifecycle::Active)
            }
            FaultHsmEvent::RecoveryStart => {
                self.transition(FaultLifecycle::Active, FaultLifecycle::Recovering)
            }
            FaultHsmEvent::RecoveryDone => {
                self.transition(FaultLifecycle::Recovering, FaultLifecycle::Cleared)
            }
            FaultHsmEvent::ClearFault => {
                if self.transition(FaultLifecycle::Detected, FaultLifecycle::Cleared)
                    || self.transition(FaultLifecycle::Active, FaultLifecycle::Cleared)
                {
                    true
                } else if self.transition(FaultLifecycle::Cleared, FaultLifecycle::Dormant) {
                    self.occurrence_count.store(0, Ordering::Relaxed);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> FaultLifecycle {
        FaultLifecycle::from_raw(self.state.load(Ordering::Acquire))
            .unwrap_or(FaultLifecycle::Dormant)
    }

    /// Name of the current state.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.state().as_str()
    }

    /// True in the `Dormant` state.
    #[must_use]
    pub fn is_dormant(&self) -> bool {
        self.state() == FaultLifecycle::Dormant
    }

    /// True in the `Detected` state.
    #[must_use]
    pub fn is_detected(&self) -> bool {
        self.state() == FaultLifecycle::Detected
    }

    /// True in the `Active` state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == FaultLifecycle::Active
    }

    /// True in the `Recovering` state.
    #[must_use]
    pub fn is_recovering(&self) -> bool {
        self.state() == FaultLifecycle::Recovering
    }

    /// True in the `Cleared` state.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.state() == FaultLifecycle::Cleared
    }

    /// Bound fault index.
    #[must_use]
    pub const fn fault_index(&self) -> u16 {
        self.fault_index
    }

    /// Snapshot the machine's context.
    #[must_use]
    pub fn context(&self) -> PerFaultContext {
        PerFaultContext {
            fault_index: self.fault_index,
            occurrence_count: self.occurrence_count.load(Ordering::Relaxed),
            err_threshold: self.err_threshold,
        }
    }

    fn transition(&self, from: FaultLifecycle, to: FaultLifecycle) -> bool {
        self.state
            .compare_exchange(
                from.to_raw(),
                to.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for PerFaultHsm {
    fn default() -> Self {
        Self::new()
    }
}
