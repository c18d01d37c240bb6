//! System-level fault state machine.
//!
//! The global machine expresses the aggregate fault posture of the system.
//! All transitions are atomic compare-exchanges, so dispatch is safe from
//! either side of the collector without extra locking.
//!
//! # State Transition Diagram
//!
//! ```text
//! Idle ──FaultReported──► Active
//! Active ──AllCleared──► Idle
//! Active ──CriticalDetected──► Degraded
//! Active ──ShutdownReq──► Shutdown
//! Degraded ──DegradeRecovered──► Active
//! Degraded ──ShutdownReq──► Shutdown
//! ```
//!
//! Shutdown is terminal. Events with no transition defined from the current
//! state are ignored and reported through the dispatch return value.

use core::fmt;

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Global fault posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GlobalState {
    /// No fault has been admitted since the last all-clear.
    #[default]
    Idle = 0,
    /// Faults present, normal processing.
    Active = 1,
    /// A critical fault was detected.
    Degraded = 2,
    /// Shutdown requested (terminal).
    Shutdown = 3,
}

impl GlobalState {
    /// Convert from raw u8 value.
    #[must_use]
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Active),
            2 => Some(Self::Degraded),
            3 => Some(Self::Shutdown),
            _ => None,
        }
    }

    /// Convert to raw u8 value.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// True for states with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Shutdown)
    }

    /// Get the state as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Active => "Active",
            Self::Degraded => "Degraded",
            Self::Shutdown => "Shutdown",
        }
    }
}

impl fmt::Display for GlobalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events dispatched to the global machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalEvent {
    /// A fault was admitted while the system was idle.
    FaultReported,
    /// The last active fault was cleared.
    AllCleared,
    /// A critical-priority fault was admitted.
    CriticalDetected,
    /// A hook requested system shutdown.
    ShutdownReq,
    /// The last critical fault was resolved.
    DegradeRecovered,
}

/// Snapshot of the global machine's advisory context.
///
/// The counts are advisory monitoring data; the activity bitmap is the
/// authoritative active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalHsmContext {
    /// Number of currently active faults (advisory).
    pub active_count: u32,
    /// Number of critical faults seen since the last all-clear.
    pub critical_count: u32,
    /// Shutdown flag.
    pub shutdown_requested: bool,
}

/// Global fault state machine with atomic transitions.
#[derive(Debug)]
pub struct GlobalHsm {
    state: AtomicU8,
    active_count: AtomicU32,
    critical_count: AtomicU32,
    shutdown_requested: AtomicBool,
}

impl GlobalHsm {
    /// Create a machine in the `Idle` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(GlobalState::Idle.to_raw()),
            active_count: AtomicU32::new(0),
            critical_count: AtomicU32::new(0),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Dispatch an event to the state machine.
    ///
    /// Returns true when a transition fired; false when the current state
    /// defines no transition for the event.
    pub fn dispatch(&self, event: GlobalEvent) -> bool {
        match event {
            GlobalEvent::FaultReported => self.transition(GlobalState::Idle, GlobalState::Active),
            GlobalEvent::AllCleared => {
                let moved = self.transition(GlobalState::Active, GlobalState::Idle);
                if moved {
                    self.active_count.store(0, Ordering::Relaxed);
                    self.critical_count.store(0, Ordering::Relaxed);
                }
                moved
            }
            GlobalEvent::CriticalDetected => {
                self.transition(GlobalState::Active, GlobalState::Degraded)
            }
            GlobalEvent::DegradeRecovered => {
                self.transition(GlobalState::Degraded, GlobalState::Active)
            }
            GlobalEvent::ShutdownReq => {
                let moved = self.transition(GlobalState::Active, GlobalState::Shutdown)
                    || self.transition(GlobalState::Degraded, GlobalState::Shutdown);
                if moved {
                    self.shutdown_requested.store(true, Ordering::Relaxed);
                }
                moved
            }
        }
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> GlobalState {
        GlobalState::from_raw(self.state.load(Ordering::Acquire)).unwrap_or(GlobalState::Idle)
    }

    /// Name of the current state.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.state().as_str()
    }

    /// True in the `Idle` state.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state() == GlobalState::Idle
    }

    /// True in the `Active` state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == GlobalState::Active
    }

    /// True in the `Degraded` state.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.state() == GlobalState::Degraded
    }

    /// True in the `Shutdown` state.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.state() == GlobalState::Shutdown
    }

    /// Snapshot the advisory context.
    #[must_use]
    pub fn context(&self) -> GlobalHsmContext {
        GlobalHsmContext {
            active_count: self.active_count.load(Ordering::Relaxed),
            critical_count: self.critical_count.load(Ordering::Relaxed),
            shutdown_requested: self.shutdown_requested.load(Ordering::Relaxed),
        }
    }

    /// Reset to `Idle` and zero the context.
    pub fn reset(&self) {
        self.state
            .store(GlobalState::Idle.to_raw(), Ordering::Release);
        self.active_count.store(0, Ordering::Relaxed);
        self.critical_count.store(0, Ordering::Relaxed);
        self.shutdown_requested.store(false, Ordering::Relaxed);
    }

    /// Count a critical fault into the advisory context.
    pub(crate) fn note_critical(&self) {
        self.critical_count.fetch_add(1, Ordering::Relaxed);
    }

    fn transition(&self, from: GlobalState, to: GlobalState) -> bool {
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

impl Default for GlobalHsm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let hsm = GlobalHsm::new();
        assert!(hsm.is_idle());
        assert_eq!(hsm.state_name(), "Idle");
    }

    #[test]
    fn test_full_lifecycle() {
        let hsm = GlobalHsm::new();

        assert!(hsm.dispatch(GlobalEvent::FaultReported));
        assert!(hsm.is_active());

        assert!(hsm.dispatch(GlobalEvent::CriticalDetected));
        assert!(hsm.is_degraded());

        assert!(hsm.dispatch(GlobalEvent::DegradeRecovered));
        assert!(hsm.is_active());

        assert!(hsm.dispatch(GlobalEvent::AllCleared));
        assert!(hsm.is_idle());
    }

    #[test]
    fn test_shutdown_from_active_and_degraded() {
        let hsm = GlobalHsm::new();
        hsm.dispatch(GlobalEvent::FaultReported);
        assert!(hsm.dispatch(GlobalEvent::ShutdownReq));
        assert!(hsm.is_shutdown());
        assert!(hsm.context().shutdown_requested);

        let hsm = GlobalHsm::new();
        hsm.dispatch(GlobalEvent::FaultReported);
        hsm.dispatch(GlobalEvent::CriticalDetected);
        assert!(hsm.dispatch(GlobalEvent::ShutdownReq));
        assert!(hsm.is_shutdown());
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let hsm = GlobalHsm::new();
        hsm.dispatch(GlobalEvent::FaultReported);
        hsm.dispatch(GlobalEvent::ShutdownReq);

        assert!(!hsm.dispatch(GlobalEvent::FaultReported));
        assert!(!hsm.dispatch(GlobalEvent::AllCleared));
        assert!(!hsm.dispatch(GlobalEvent::DegradeRecovered));
        assert!(hsm.is_shutdown());
        assert!(GlobalState::Shutdown.is_terminal());
    }

    #[test]
    fn test_unmatched_events_ignored() {
        let hsm = GlobalHsm::new();

        assert!(!hsm.dispatch(GlobalEvent::AllCleared));
        assert!(!hsm.dispatch(GlobalEvent::CriticalDetected));
        assert!(!hsm.dispatch(GlobalEvent::ShutdownReq));
        assert!(hsm.is_idle());
    }

    #[test]
    fn test_all_cleared_zeroes_context() {
        let hsm = GlobalHsm::new();
        hsm.dispatch(GlobalEvent::FaultReported);
        hsm.note_critical();
        assert_eq!(hsm.context().critical_count, 1);

        hsm.dispatch(GlobalEvent::AllCleared);
        assert_eq!(hsm.context(), GlobalHsmContext::default());
    }

    #[test]
    fn test_reset() {
        let hsm = GlobalHsm::new();
        hsm.dispatch(GlobalEvent::FaultReported);
        hsm.dispatch(GlobalEvent::ShutdownReq);

        hsm.reset();
        assert!(hsm.is_idle());
        assert!(!hsm.context().shutdown_requested);
    }
}
