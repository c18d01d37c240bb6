//! Software FCCU (Fault Collection and Control Unit) for MCU-class
//! real-time targets.
//!
//! This crate centralizes fault reporting, prioritization, lifecycle
//! tracking, and policy-driven dispatch inside a single embedded process,
//! emulating a hardware FCCU's responsibilities in software.
//!
//! # Architecture
//!
//! The collector integrates four tightly coupled subsystems:
//!
//! - **Priority queue set**: one SPSC ring per priority level with a
//!   producer-side admission gate (from [`fccu_atomic`])
//! - **Fault table**: fixed registry of fault descriptors with an atomic
//!   activity bitmap and statistics
//! - **Two-layer state machines**: a global Idle/Active/Degraded/Shutdown
//!   machine and optional per-fault lifecycle machines
//! - **Hook dispatch**: synchronous callbacks converting queued reports
//!   into policy actions (handle, escalate, defer, shutdown)
//!
//! # RT-Safety
//!
//! The report and drain paths are RT-safe:
//! - No heap allocations (all storage is inline and compile-time sized)
//! - No blocking operations; queue operations are wait-free under the
//!   SPSC discipline
//! - Bounded execution time; hook runtime is the integrator's
//!   responsibility
//!
//! # Threading Model
//!
//! Single-producer / single-consumer: exactly one thread of control calls
//! [`FaultCollector::report`] and exactly one - possibly the same - calls
//! [`FaultCollector::drain`]. Multi-producer scenarios are serialized by an
//! external message bus before reaching the collector.
//!
//! # Example
//!
//! ```rust
//! use fccu::{FaultCollector, FaultPriority, HookAction};
//!
//! let handled = |_: &fccu::FaultEvent| HookAction::Handled;
//!
//! let mut collector: FaultCollector<'_, 16, 8, 4, 4> = FaultCollector::new();
//! collector.register_fault(0, 0x1001, 0, 1)?;
//! collector.register_hook(0, &handled)?;
//!
//! collector.report(0, 0xAA, FaultPriority::High)?;
//! assert_eq!(collector.active_fault_count(), 1);
//!
//! let processed = collector.drain();
//! assert_eq!(processed, 1);
//! assert_eq!(collector.active_fault_count(), 0);
//! # Ok::<(), fccu::FccuError>(())
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[cfg(any(feature = "std", test))]
extern crate std;

mod clock;
mod collector;
mod error;
mod event;
mod global_hsm;
mod per_fault_hsm;
mod recent;
mod table;

pub mod prelude;

pub use clock::MonotonicClock;
#[cfg(feature = "std")]
pub use clock::steady_now_us;
pub use collector::{FaultCollector, FaultReporter};
pub use error::{FccuError, FccuResult};
pub use event::{
    BackpressureLevel, BusNotifier, FaultEntry, FaultEvent, FaultHook, FaultPriority, HookAction,
    OverflowHook, RecentFaultInfo, ShutdownHook,
};
pub use fccu_atomic::FaultStatistics;
pub use global_hsm::{GlobalEvent, GlobalHsm, GlobalHsmContext, GlobalState};
pub use per_fault_hsm::{FaultHsmEvent, FaultLifecycle, PerFaultContext, PerFaultHsm};
pub use recent::RECENT_RING_SIZE;
pub use table::FaultTable;
