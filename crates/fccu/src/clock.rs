//! Monotonic time source injection.
//!
//! The collector timestamps queued entries with a microsecond-resolution
//! monotonic clock supplied as a plain function pointer. Any source that
//! cannot go backward is acceptable; the clock is used only for event
//! timestamps, never for scheduling.

/// Monotonic microsecond clock.
pub type MonotonicClock = fn() -> u64;

/// Microseconds since the first call, from `std::time::Instant`.
///
/// This is the default clock of [`crate::FaultCollector::new`]. Bare-metal
/// integrators supply their own source through
/// [`crate::FaultCollector::with_clock`].
#[cfg(feature = "std")]
#[must_use]
pub fn steady_now_us() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = *EPOCH.get_or_init(Instant::now);
    u64::try_from(epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_steady_clock_is_monotonic() {
        let a = steady_now_us();
        let b = steady_now_us();
        assert!(b >= a);
    }
}
