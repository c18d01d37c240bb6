//! Fault priorities, hook actions, and the queued/delivered record types.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fault report priority.
///
/// Lower numeric value means higher priority; the value doubles as the
/// target queue level (clamped to the configured level count on report).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FaultPriority {
    /// Immediate attention; admitted while a slot is physically free.
    Critical = 0,
    /// Prompt attention.
    High = 1,
    /// Routine processing.
    #[default]
    Medium = 2,
    /// Informational; first to be shed under backpressure.
    Low = 3,
}

impl FaultPriority {
    /// Queue level corresponding to this priority.
    #[inline]
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Convert from a raw queue level.
    #[must_use]
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Critical),
            1 => Some(Self::High),
            2 => Some(Self::Medium),
            3 => Some(Self::Low),
            _ => None,
        }
    }

    /// Get the priority as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for FaultPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action returned by a fault hook, deciding the fault's post-processing
/// fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum HookAction {
    /// The fault is resolved: clear its activity bit.
    Handled = 0,
    /// Re-enqueue the entry one priority level higher for another pass.
    Escalate = 1,
    /// Consume the entry but leave the fault active.
    Defer = 2,
    /// Latch system shutdown; draining stops after the current pass.
    Shutdown = 3,
}

impl HookAction {
    /// Get the action as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handled => "Handled",
            Self::Escalate => "Escalate",
            Self::Defer => "Defer",
            Self::Shutdown => "Shutdown",
        }
    }
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse aggregate queue fill signal, exposed for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum BackpressureLevel {
    /// Below 60% aggregate fill.
    #[default]
    Normal = 0,
    /// At or above 60%.
    Warning = 1,
    /// At or above 80%.
    Critical = 2,
    /// At or above 95%.
    Full = 3,
}

impl BackpressureLevel {
    /// Get the level as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
            Self::Full => "Full",
        }
    }
}

impl fmt::Display for BackpressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Queued fault record, created at admission and consumed at drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaultEntry {
    /// Index of the reported fault.
    pub fault_index: u16,
    /// Priority the fault was reported at.
    pub priority: FaultPriority,
    /// Opaque caller-supplied payload.
    pub detail: u32,
    /// Monotonic timestamp in microseconds, sampled at report time.
    pub timestamp_us: u64,
}

/// Fault event delivered to hooks and the bus notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaultEvent {
    /// Index of the fault.
    pub fault_index: u16,
    /// Priority the fault was reported at.
    pub priority: FaultPriority,
    /// Registered fault code.
    pub fault_code: u32,
    /// Opaque caller-supplied payload.
    pub detail: u32,
    /// Monotonic timestamp in microseconds from the queued entry.
    pub timestamp_us: u64,
    /// 1-based occurrence count at the time of processing.
    pub occurrence_count: u32,
    /// True when this event took the occurrence count from 0 to 1.
    pub is_first: bool,
}

/// Compact slice of a processed event retained in the recent-fault ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecentFaultInfo {
    /// Index of the fault.
    pub fault_index: u16,
    /// Opaque caller-supplied payload.
    pub detail: u32,
    /// Priority the fault was reported at.
    pub priority: FaultPriority,
    /// Monotonic timestamp in microseconds.
    pub timestamp_us: u64,
}

/// Per-fault hook: receives the event, returns the action to apply.
///
/// Invoked synchronously on the consumer thread during a drain. A hook must
/// not re-enter the drain; it may report only when producer and consumer
/// are the same thread. State captured by the closure lives in user-owned
/// storage for the collector's lifetime.
pub type FaultHook<'h> = &'h (dyn Fn(&FaultEvent) -> HookAction + Sync);

/// Overflow callback: invoked on the producer thread when a report is
/// rejected by admission or a full ring.
pub type OverflowHook<'h> = &'h (dyn Fn(u16, FaultPriority) + Sync);

/// Shutdown callback: invoked on the consumer thread when a hook latches
/// shutdown.
pub type ShutdownHook<'h> = &'h (dyn Fn() + Sync);

/// Bus notification injection point: invoked on the consumer thread for
/// every processed event, before the hook. Must not report back into the
/// same collector.
pub type BusNotifier<'h> = &'h (dyn Fn(&FaultEvent) + Sync);
