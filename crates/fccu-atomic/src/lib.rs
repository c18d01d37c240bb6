//! # fccu-atomic
//!
//! RT-safe lock-free primitives for the software FCCU (fault collection and
//! control unit).
//!
//! This crate provides the storage and synchronization primitives the fault
//! collector builds on. Everything here is usable from the hot path of an
//! embedded control loop without allocations, blocking, or syscalls.
//!
//! ## Safety Guarantees
//!
//! - **No heap allocations** - all storage is inline, sized at compile time
//! - **No blocking operations** - all methods are lock-free
//! - **No syscalls** in hot paths
//! - **Deterministic execution time** for all operations
//!
//! ## Architecture
//!
//! The crate is organized into four modules:
//!
//! - [`ring`] - Bounded single-producer single-consumer ring buffer
//! - [`queues`] - Multi-level priority queue set with admission control
//! - [`bitmap`] - Atomic fault activity bitmap
//! - [`counters`] - Atomic fault statistics counters
//!
//! ## Usage
//!
//! ```rust
//! use fccu_atomic::PriorityQueueSet;
//!
//! let queues: PriorityQueueSet<u32, 4, 8> = PriorityQueueSet::new();
//!
//! // Producer side (no allocations, no blocking)
//! queues.push_with_admission(2, 0xAB).ok();
//!
//! // Consumer side - highest priority first
//! while let Some((item, level)) = queues.pop() {
//!     let _ = (item, level);
//! }
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bitmap;
pub mod counters;
pub mod queues;
pub mod ring;

pub mod prelude;

pub use bitmap::ActivityBitmap;
pub use counters::{FaultCounters, FaultStatistics, PRIORITY_LANES};
pub use queues::PriorityQueueSet;
pub use ring::SpscRing;
