//! Error types for collector operations.

use core::fmt;

/// Collector operation errors.
///
/// Configuration errors (`InvalidIndex`, `AlreadyRegistered`,
/// `NotRegistered`, `HsmSlotFull`) indicate a caller mistake to correct and
/// retry. `QueueFull` and `AdmissionDenied` are backpressure signals: the
/// report was shed and should not be retried immediately. The report path
/// surfaces admission denials as `QueueFull`; `AdmissionDenied` is reserved
/// for integrators probing the admission gate directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FccuError {
    /// The target queue rejected the report (admission denied or ring
    /// full).
    QueueFull,
    /// Fault index outside the configured registry range.
    InvalidIndex,
    /// The fault slot is already registered.
    AlreadyRegistered,
    /// The fault slot has not been registered.
    NotRegistered,
    /// Report shed by the priority admission gate.
    AdmissionDenied,
    /// All per-fault state machine slots are consumed.
    HsmSlotFull,
}

impl fmt::Display for FccuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FccuError::QueueFull => write!(f, "Fault queue rejected the report"),
            FccuError::InvalidIndex => write!(f, "Fault index out of range"),
            FccuError::AlreadyRegistered => write!(f, "Fault is already registered"),
            FccuError::NotRegistered => write!(f, "Fault is not registered"),
            FccuError::AdmissionDenied => write!(f, "Report shed by priority admission"),
            FccuError::HsmSlotFull => write!(f, "No per-fault state machine slot left"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FccuError {}

/// Result type for collector operations.
pub type FccuResult<T> = Result<T, FccuError>;

impl FccuError {
    /// True for backpressure signals that shed the report.
    #[must_use]
    pub fn is_backpressure(&self) -> bool {
        matches!(self, FccuError::QueueFull | FccuError::AdmissionDenied)
    }

    /// True for configuration mistakes the caller should correct.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FccuError::InvalidIndex
                | FccuError::AlreadyRegistered
                | FccuError::NotRegistered
                | FccuError::HsmSlotFull
        )
    }
}
