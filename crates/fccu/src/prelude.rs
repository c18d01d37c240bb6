//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types.
//!
//! # Example
//!
//! ```rust
//! use fccu::prelude::*;
//! ```

pub use crate::{
    BackpressureLevel, FaultCollector, FaultEntry, FaultEvent, FaultLifecycle, FaultPriority,
    FaultReporter, FaultStatistics, FccuError, FccuResult, GlobalState, HookAction,
    RecentFaultInfo, RECENT_RING_SIZE,
};
