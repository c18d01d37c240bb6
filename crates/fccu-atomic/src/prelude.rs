//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types.
//!
//! # Example
//!
//! ```rust
//! use fccu_atomic::prelude::*;
//! ```

pub use crate::{
    ActivityBitmap, FaultCounters, FaultStatistics, PriorityQueueSet, SpscRing, PRIORITY_LANES,
};
