//! The fault collector engine.
//!
//! [`FaultCollector`] wires the priority queue set, the registration table,
//! the activity bitmap, the two state machine layers, and the hook dispatch
//! protocol into one component. Producer-side ingress runs through
//! [`FaultCollector::report`], consumer-side egress through
//! [`FaultCollector::drain`].
//!
//! # Concurrency
//!
//! The collector follows the SPSC discipline of its event ring: exactly one
//! thread of control may report, exactly one (possibly the same) may drain.
//! The two sides synchronize solely through the ring and the atomic
//! bitmap, counters, and state machine words. Configuration
//! (`register_*`, `set_*`, `bind_fault_hsm`) takes `&mut self` and happens
//! before the producer/consumer threads start.
//!
//! Bitmap, statistics, and state machine updates are not atomic as a group
//! with the ring push: a racing observer may see an activity bit for an
//! entry it has not popped yet, and briefly the reverse after a `Handled`
//! hook. The bitmap is a presence indicator; the ring carries the
//! authoritative event stream.

use core::fmt;

use fccu_atomic::{ActivityBitmap, FaultCounters, FaultStatistics, PriorityQueueSet};
use portable_atomic::{AtomicBool, Ordering};

use crate::clock::MonotonicClock;
use crate::error::{FccuError, FccuResult};
use crate::event::{
    BackpressureLevel, BusNotifier, FaultEntry, FaultEvent, FaultHook, FaultPriority, HookAction,
    OverflowHook, RecentFaultInfo, ShutdownHook,
};
use crate::global_hsm::{GlobalEvent, GlobalHsm};
use crate::per_fault_hsm::{FaultHsmEvent, FaultLifecycle, PerFaultHsm};
use crate::recent::RecentRing;
use crate::table::FaultTable;

/// Software fault collection and control unit.
///
/// Const parameters:
///
/// - `MAX_FAULTS`: maximum fault points (1..=256)
/// - `QUEUE_DEPTH`: queue capacity per priority level (power of two)
/// - `QUEUE_LEVELS`: number of priority levels (1..=8)
/// - `MAX_FAULT_HSMS`: per-fault state machine slots (<= 16)
///
/// The `'h` lifetime bounds the hook and callback borrows; closures that
/// capture state live in user-owned storage that outlives the collector.
///
/// # Example
///
/// ```rust
/// use fccu::{FaultCollector, FaultPriority, HookAction};
///
/// let handled = |_: &fccu::FaultEvent| HookAction::Handled;
/// let mut collector: FaultCollector<'_, 16, 8, 4, 4> = FaultCollector::new();
/// collector.register_fault(0, 0x1001, 0, 1)?;
/// collector.register_hook(0, &handled)?;
///
/// collector.report(0, 0xAA, FaultPriority::Medium)?;
/// assert!(collector.is_fault_active(0));
///
/// assert_eq!(collector.drain(), 1);
/// assert!(!collector.is_fault_active(0));
/// # Ok::<(), fccu::FccuError>(())
/// ```
pub struct FaultCollector<
    'h,
    const MAX_FAULTS: usize = 64,
    const QUEUE_DEPTH: usize = 32,
    const QUEUE_LEVELS: usize = 4,
    const MAX_FAULT_HSMS: usize = 8,
> {
    queues: PriorityQueueSet<FaultEntry, QUEUE_LEVELS, QUEUE_DEPTH>,
    table: FaultTable<'h, MAX_FAULTS>,
    bitmap: ActivityBitmap,
    counters: FaultCounters,
    global_hsm: GlobalHsm,
    fault_hsms: heapless::Vec<PerFaultHsm, MAX_FAULT_HSMS>,
    recent: RecentRing,
    default_hook: Option<FaultHook<'h>>,
    overflow_hook: Option<OverflowHook<'h>>,
    shutdown_hook: Option<ShutdownHook<'h>>,
    bus_notifier: Option<BusNotifier<'h>>,
    shutdown_requested: AtomicBool,
    now_us: MonotonicClock,
}

#[cfg(feature = "std")]
impl<
        'h,
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_FAULT_HSMS: usize,
    > FaultCollector<'h, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>
{
    /// Create a collector using the default steady clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(crate::clock::steady_now_us)
    }
}

#[cfg(feature = "std")]
impl<
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_FAULT_HSMS: usize,
    > Default for FaultCollector<'_, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<
        'h,
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_FAULT_HSMS: usize,
    > FaultCollector<'h, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>
{
    /// Create a collector with a caller-supplied monotonic microsecond
    /// clock.
    #[must_use]
    pub fn with_clock(now_us: MonotonicClock) -> Self {
        const {
            assert!(MAX_FAULTS >= 1 && MAX_FAULTS <= 256, "MAX_FAULTS must be 1..=256");
            assert!(QUEUE_DEPTH.is_power_of_two(), "QUEUE_DEPTH must be a power of two");
            assert!(QUEUE_LEVELS >= 1 && QUEUE_LEVELS <= 8, "QUEUE_LEVELS must be 1..=8");
            assert!(MAX_FAULT_HSMS <= 16, "MAX_FAULT_HSMS must be <= 16");
        }
        Self {
            queues: PriorityQueueSet::new(),
            table: FaultTable::new(),
            bitmap: ActivityBitmap::new(),
            counters: FaultCounters::new(),
            global_hsm: GlobalHsm::new(),
            fault_hsms: heapless::Vec::new(),
            recent: RecentRing::new(),
            default_hook: None,
            overflow_hook: None,
            shutdown_hook: None,
            bus_notifier: None,
            shutdown_requested: AtomicBool::new(false),
            now_us,
        }
    }

    // --- Configuration (call before processing) ---

    /// Register a fault descriptor.
    ///
    /// # Errors
    ///
    /// `InvalidIndex` when the index is out of range, `AlreadyRegistered`
    /// on a duplicate registration.
    pub fn register_fault(
        &mut self,
        fault_index: u16,
        fault_code: u32,
        attr: u32,
        err_threshold: u32,
    ) -> FccuResult<()> {
        if usize::from(fault_index) >= MAX_FAULTS {
            return Err(FccuError::InvalidIndex);
        }
        self.table.register(fault_index, fault_code, attr, err_threshold)
    }

    /// Attach a per-fault hook to a registered fault.
    ///
    /// # Errors
    ///
    /// `InvalidIndex` when the index is out of range, `NotRegistered` when
    /// the fault has not been registered.
    pub fn register_hook(&mut self, fault_index: u16, hook: FaultHook<'h>) -> FccuResult<()> {
        if usize::from(fault_index) >= MAX_FAULTS {
            return Err(FccuError::InvalidIndex);
        }
        self.table.set_hook(fault_index, hook)
    }

    /// Set the hook used for faults without a per-fault hook. `None`
    /// disables it.
    pub fn set_default_hook(&mut self, hook: Option<FaultHook<'h>>) {
        self.default_hook = hook;
    }

    /// Set the callback invoked when a report is shed. `None` disables it.
    pub fn set_overflow_hook(&mut self, hook: Option<OverflowHook<'h>>) {
        self.overflow_hook = hook;
    }

    /// Set the callback invoked when a hook latches shutdown. `None`
    /// disables it.
    pub fn set_shutdown_hook(&mut self, hook: Option<ShutdownHook<'h>>) {
        self.shutdown_hook = hook;
    }

    /// Set the external bus notification injection point. `None` disables
    /// it.
    pub fn set_bus_notifier(&mut self, notifier: Option<BusNotifier<'h>>) {
        self.bus_notifier = notifier;
    }

    /// Bind a per-fault state machine to a fault index.
    ///
    /// Slots are consumed monotonically and persist for the collector's
    /// lifetime. Binding does not require a prior registration, but such a
    /// binding receives no events until the fault is registered. When the
    /// same index is bound twice, the first binding receives the events.
    ///
    /// # Errors
    ///
    /// `InvalidIndex` when the index is out of range, `HsmSlotFull` when
    /// every slot is consumed.
    pub fn bind_fault_hsm(&mut self, fault_index: u16, threshold: u32) -> FccuResult<()> {
        if usize::from(fault_index) >= MAX_FAULTS {
            return Err(FccuError::InvalidIndex);
        }
        let mut hsm = PerFaultHsm::new();
        hsm.bind(fault_index, threshold);
        self.fault_hsms
            .push(hsm)
            .map_err(|_| FccuError::HsmSlotFull)
    }

    // --- Reporting (producer side, hot path) ---

    /// Report a fault occurrence.
    ///
    /// A priority numerically beyond the configured level count is clamped
    /// to the lowest level; the report is still subject to that level's
    /// admission gate.
    ///
    /// # Errors
    ///
    /// `InvalidIndex` / `NotRegistered` on validation failure; `QueueFull`
    /// when the report was shed by admission or a full ring (the overflow
    /// callback fires first).
    pub fn report(
        &self,
        fault_index: u16,
        detail: u32,
        priority: FaultPriority,
    ) -> FccuResult<()> {
        if usize::from(fault_index) >= MAX_FAULTS {
            return Err(FccuError::InvalidIndex);
        }
        if !self.table.is_registered(fault_index) {
            return Err(FccuError::NotRegistered);
        }

        let mut level = priority.level();
        if usize::from(level) >= QUEUE_LEVELS {
            #[allow(clippy::cast_possible_truncation)]
            {
                level = (QUEUE_LEVELS - 1) as u8;
            }
        }

        let entry = FaultEntry {
            fault_index,
            priority,
            detail,
            timestamp_us: (self.now_us)(),
        };

        if self.queues.push_with_admission(level, entry).is_err() {
            self.counters.record_dropped(level);
            if let Some(overflow) = self.overflow_hook {
                overflow(fault_index, priority);
            }
            return Err(FccuError::QueueFull);
        }

        self.bitmap.set(fault_index);
        self.counters.record_reported(level);

        self.dispatch_fault_event(fault_index, FaultHsmEvent::Detected);

        if self.global_hsm.is_idle() {
            self.global_hsm.dispatch(GlobalEvent::FaultReported);
        }
        if priority == FaultPriority::Critical && !self.global_hsm.is_degraded() {
            self.global_hsm.dispatch(GlobalEvent::CriticalDetected);
            self.global_hsm.note_critical();
        }

        Ok(())
    }

    // --- Processing (consumer side) ---

    /// Drain the queue set, processing every entry.
    ///
    /// Returns the number of entries processed in this call. Returns 0
    /// without consuming anything once shutdown has been latched.
    pub fn drain(&self) -> u32 {
        if self.shutdown_requested.load(Ordering::Acquire) {
            return 0;
        }

        let mut processed = 0;
        while let Some((entry, _level)) = self.queues.pop() {
            self.process_entry(&entry);
            processed += 1;
        }
        processed
    }

    fn process_entry(&self, entry: &FaultEntry) {
        let fault_index = entry.fault_index;
        // Reports are validated; a corrupt entry is silently dropped.
        if usize::from(fault_index) >= MAX_FAULTS {
            return;
        }

        let table_entry = self.table.entry(usize::from(fault_index));
        let prev_count = table_entry.bump_occurrence();

        let event = FaultEvent {
            fault_index,
            priority: entry.priority,
            fault_code: table_entry.fault_code(),
            detail: entry.detail,
            timestamp_us: entry.timestamp_us,
            occurrence_count: prev_count + 1,
            is_first: prev_count == 0,
        };

        self.recent.record(RecentFaultInfo {
            fault_index,
            detail: event.detail,
            priority: event.priority,
            timestamp_us: event.timestamp_us,
        });

        if let Some(notify) = self.bus_notifier {
            notify(&event);
        }

        // The table counter, advanced on this side, gates confirmation;
        // the machine's own guard rejects spurious early confirmations.
        if event.occurrence_count >= table_entry.err_threshold() {
            self.dispatch_fault_event(fault_index, FaultHsmEvent::Confirmed);
        }

        let action = match table_entry.hook().or(self.default_hook) {
            Some(hook) => hook(&event),
            None => HookAction::Handled,
        };

        match action {
            HookAction::Handled => {
                self.bitmap.clear(fault_index);
                self.dispatch_fault_event(fault_index, FaultHsmEvent::ClearFault);
                if self.active_fault_count() == 0 {
                    self.global_hsm.dispatch(GlobalEvent::AllCleared);
                }
            }
            HookAction::Escalate => self.escalate(entry),
            HookAction::Defer => {}
            HookAction::Shutdown => {
                self.shutdown_requested.store(true, Ordering::Release);
                self.global_hsm.dispatch(GlobalEvent::ShutdownReq);
                if let Some(shutdown) = self.shutdown_hook {
                    shutdown();
                }
            }
        }

        self.counters.record_processed();
    }

    /// Re-enqueue an entry one priority level higher, bypassing admission.
    fn escalate(&self, original: &FaultEntry) {
        let level = original.priority.level();
        if level == 0 {
            // Already at the top level.
            return;
        }
        let Some(priority) = FaultPriority::from_raw(level - 1) else {
            return;
        };

        let escalated = FaultEntry {
            priority,
            timestamp_us: (self.now_us)(),
            ..*original
        };

        if self.queues.push(level - 1, escalated).is_err() {
            self.counters.record_requeue_dropped();
        }
    }

    fn dispatch_fault_event(&self, fault_index: u16, event: FaultHsmEvent) {
        if let Some(hsm) = self
            .fault_hsms
            .iter()
            .find(|hsm| hsm.fault_index() == fault_index)
        {
            hsm.dispatch(event);
        }
    }

    // --- Query Operations ---

    /// True when the fault's activity bit is set.
    #[must_use]
    pub fn is_fault_active(&self, fault_index: u16) -> bool {
        usize::from(fault_index) < MAX_FAULTS && self.bitmap.test(fault_index)
    }

    /// Number of currently active faults (bitmap population count).
    #[must_use]
    pub fn active_fault_count(&self) -> u32 {
        self.bitmap.count_ones()
    }

    /// True when the index is in range and registered.
    #[must_use]
    pub fn is_registered(&self, fault_index: u16) -> bool {
        self.table.is_registered(fault_index)
    }

    /// Lifecycle state of the machine bound to `fault_index`, if any.
    #[must_use]
    pub fn fault_hsm_state(&self, fault_index: u16) -> Option<FaultLifecycle> {
        self.fault_hsms
            .iter()
            .find(|hsm| hsm.fault_index() == fault_index)
            .map(PerFaultHsm::state)
    }

    /// Access the global state machine.
    #[must_use]
    pub fn global_hsm(&self) -> &GlobalHsm {
        &self.global_hsm
    }

    /// True once a hook has latched shutdown.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    // --- Administrative Operations ---

    /// Clear one fault: activity bit, occurrence counter, and bound state
    /// machine.
    ///
    /// Out-of-range indices are ignored.
    pub fn clear_fault(&self, fault_index: u16) {
        if usize::from(fault_index) >= MAX_FAULTS {
            return;
        }
        self.bitmap.clear(fault_index);
        self.table.entry(usize::from(fault_index)).clear_occurrence();

        self.dispatch_fault_event(fault_index, FaultHsmEvent::ClearFault);

        if self.active_fault_count() == 0 {
            self.global_hsm.dispatch(GlobalEvent::AllCleared);
        }
    }

    /// Clear every fault: bitmap, all occurrence counters, every bound
    /// state machine. Idempotent.
    pub fn clear_all_faults(&self) {
        self.bitmap.clear_all();
        self.table.reset_occurrences();
        for hsm in &self.fault_hsms {
            hsm.reset();
        }
        self.global_hsm.dispatch(GlobalEvent::AllCleared);
    }

    /// Snapshot the statistics counters.
    #[must_use]
    pub fn statistics(&self) -> FaultStatistics {
        self.counters.snapshot()
    }

    /// Zero the statistics counters.
    pub fn reset_statistics(&self) {
        self.counters.reset();
    }

    /// Coarse aggregate queue fill signal.
    #[must_use]
    pub fn backpressure_level(&self) -> BackpressureLevel {
        let capacity = QUEUE_DEPTH * QUEUE_LEVELS;
        if capacity == 0 {
            return BackpressureLevel::Full;
        }
        let pct = self.queues.total_len() * 100 / capacity;
        if pct >= 95 {
            BackpressureLevel::Full
        } else if pct >= 80 {
            BackpressureLevel::Critical
        } else if pct >= 60 {
            BackpressureLevel::Warning
        } else {
            BackpressureLevel::Normal
        }
    }

    /// Enumerate recently processed faults newest-first, up to `max_count`
    /// entries (consumer side).
    pub fn for_each_recent<F: FnMut(&RecentFaultInfo)>(&self, max_count: usize, f: F) {
        self.recent.for_each(max_count, f);
    }

    /// Number of retained recent faults (at most
    /// [`RECENT_RING_SIZE`](crate::RECENT_RING_SIZE)).
    #[must_use]
    pub fn recent_count(&self) -> usize {
        self.recent.len()
    }

    /// Get a reporter forwarding to this collector.
    ///
    /// The reporter is the dependency-injection seam for producer modules:
    /// a copyable handle that carries the reporting capability without
    /// exposing the rest of the collector.
    #[must_use]
    pub fn reporter(
        &self,
    ) -> FaultReporter<'_, 'h, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS> {
        FaultReporter {
            collector: Some(self),
        }
    }
}

impl<
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_FAULT_HSMS: usize,
    > fmt::Debug for FaultCollector<'_, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultCollector")
            .field("state", &self.global_hsm.state_name())
            .field("active_faults", &self.active_fault_count())
            .field("queued", &self.queues.total_len())
            .field("shutdown_requested", &self.is_shutdown_requested())
            .finish_non_exhaustive()
    }
}

/// Lightweight fault reporter injection point.
///
/// A copyable `{collector, capability}` handle whose [`FaultReporter::report`]
/// forwards to the collector's producer path. A disconnected reporter
/// discards reports, so producer modules can be wired before the collector
/// exists.
#[derive(Debug, Clone, Copy)]
pub struct FaultReporter<
    'c,
    'h,
    const MAX_FAULTS: usize = 64,
    const QUEUE_DEPTH: usize = 32,
    const QUEUE_LEVELS: usize = 4,
    const MAX_FAULT_HSMS: usize = 8,
> {
    collector: Option<&'c FaultCollector<'h, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>>,
}

impl<
        'c,
        'h,
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_FAULT_HSMS: usize,
    > FaultReporter<'c, 'h, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>
{
    /// Create a reporter not connected to any collector.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { collector: None }
    }

    /// Report a fault through the connected collector.
    ///
    /// Backpressure and validation errors are absorbed, matching the
    /// fire-and-forget contract of producer modules; a disconnected
    /// reporter does nothing.
    pub fn report(&self, fault_index: u16, detail: u32, priority: FaultPriority) {
        if let Some(collector) = self.collector {
            let _ = collector.report(fault_index, detail, priority);
        }
    }

    /// True when wired to a collector.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.collector.is_some()
    }
}

impl<
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_FAULT_HSMS: usize,
    > Default for FaultReporter<'_, '_, MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_FAULT_HSMS>
{
    fn default() -> Self {
        Self::disconnected()
    }
}
