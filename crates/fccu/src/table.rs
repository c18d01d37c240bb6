//! Fixed-size fault registration table.
//!
//! One entry per fault index: code, attribute flags, error threshold, an
//! optional per-fault hook, and an atomic occurrence counter advanced by
//! the consumer. Entries are written by registration before the
//! producer/consumer threads start and only the occurrence counter mutates
//! afterwards.

use core::fmt;

use portable_atomic::{AtomicU32, Ordering};

use crate::error::{FccuError, FccuResult};
use crate::event::FaultHook;

/// One registered fault descriptor.
pub(crate) struct FaultTableEntry<'h> {
    fault_code: u32,
    attr: u32,
    err_threshold: u32,
    registered: bool,
    hook: Option<FaultHook<'h>>,
    occurrence_count: AtomicU32,
}

impl<'h> FaultTableEntry<'h> {
    const fn new() -> Self {
        Self {
            fault_code: 0,
            attr: 0,
            err_threshold: 1,
            registered: false,
            hook: None,
            occurrence_count: AtomicU32::new(0),
        }
    }

    pub(crate) fn fault_code(&self) -> u32 {
        self.fault_code
    }

    pub(crate) fn attr(&self) -> u32 {
        self.attr
    }

    pub(crate) fn err_threshold(&self) -> u32 {
        self.err_threshold
    }

    pub(crate) fn hook(&self) -> Option<FaultHook<'h>> {
        self.hook
    }

    /// Advance the occurrence counter, returning the previous value.
    pub(crate) fn bump_occurrence(&self) -> u32 {
        self.occurrence_count.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn occurrence(&self) -> u32 {
        self.occurrence_count.load(Ordering::Relaxed)
    }

    pub(crate) fn clear_occurrence(&self) {
        self.occurrence_count.store(0, Ordering::Relaxed);
    }
}

/// Fixed array of fault descriptors indexed by fault index.
///
/// `MAX_FAULTS` bounds the registry (1..=256). Registration is not
/// idempotent: a second registration of the same index is an error.
pub struct FaultTable<'h, const MAX_FAULTS: usize> {
    entries: [FaultTableEntry<'h>; MAX_FAULTS],
}

impl<'h, const MAX_FAULTS: usize> FaultTable<'h, MAX_FAULTS> {
    /// Create a table with every slot unregistered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: core::array::from_fn(|_| FaultTableEntry::new()),
        }
    }

    /// Register a fault descriptor.
    ///
    /// `err_threshold` is the occurrence count at which a confirmation is
    /// emitted during processing (>= 1).
    ///
    /// # Errors
    ///
    /// `InvalidIndex` when `fault_index` is out of range,
    /// `AlreadyRegistered` when the slot is taken.
    pub fn register(
        &mut self,
        fault_index: u16,
        fault_code: u32,
        attr: u32,
        err_threshold: u32,
    ) -> FccuResult<()> {
        let entry = self
            .entries
            .get_mut(usize::from(fault_index))
            .ok_or(FccuError::InvalidIndex)?;
        if entry.registered {
            return Err(FccuError::AlreadyRegistered);
        }
        entry.fault_code = fault_code;
        entry.attr = attr;
        entry.err_threshold = err_threshold;
        entry.registered = true;
        Ok(())
    }

    /// Attach a per-fault hook to a registered fault.
    ///
    /// Later calls overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// `InvalidIndex` when `fault_index` is out of range, `NotRegistered`
    /// when the slot has not been registered.
    pub fn set_hook(&mut self, fault_index: u16, hook: FaultHook<'h>) -> FccuResult<()> {
        let entry = self
            .entries
            .get_mut(usize::from(fault_index))
            .ok_or(FccuError::InvalidIndex)?;
        if !entry.registered {
            return Err(FccuError::NotRegistered);
        }
        entry.hook = Some(hook);
        Ok(())
    }

    /// True when the index is in range and registered.
    #[must_use]
    pub fn is_registered(&self, fault_index: u16) -> bool {
        self.entries
            .get(usize::from(fault_index))
            .is_some_and(|entry| entry.registered)
    }

    /// Registered fault code, if the index is registered.
    #[must_use]
    pub fn fault_code(&self, fault_index: u16) -> Option<u32> {
        self.entries
            .get(usize::from(fault_index))
            .filter(|entry| entry.registered)
            .map(FaultTableEntry::fault_code)
    }

    /// Registered attribute flags, if the index is registered.
    #[must_use]
    pub fn attr(&self, fault_index: u16) -> Option<u32> {
        self.entries
            .get(usize::from(fault_index))
            .filter(|entry| entry.registered)
            .map(FaultTableEntry::attr)
    }

    /// Current occurrence count for the index (0 when out of range).
    #[must_use]
    pub fn occurrence(&self, fault_index: u16) -> u32 {
        self.entries
            .get(usize::from(fault_index))
            .map_or(0, FaultTableEntry::occurrence)
    }

    /// Zero every occurrence counter.
    pub fn reset_occurrences(&self) {
        for entry in &self.entries {
            entry.clear_occurrence();
        }
    }

    pub(crate) fn entry(&self, index: usize) -> &FaultTableEntry<'h> {
        &self.entries[index]
    }

    fn registered_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.registered).count()
    }
}

impl<const MAX_FAULTS: usize> Default for FaultTable<'_, MAX_FAULTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_FAULTS: usize> fmt::Debug for FaultTable<'_, MAX_FAULTS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultTable")
            .field("capacity", &MAX_FAULTS)
            .field("registered", &self.registered_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FaultEvent, HookAction};

    fn handled_hook(_event: &FaultEvent) -> HookAction {
        HookAction::Handled
    }

    #[test]
    fn test_register_basic() {
        let mut table: FaultTable<'_, 16> = FaultTable::new();
        assert!(table.register(0, 0x1001, 0, 1).is_ok());
        assert!(table.register(1, 0x1002, 0, 3).is_ok());
        assert!(table.is_registered(0));
        assert_eq!(table.fault_code(1), Some(0x1002));
    }

    #[test]
    fn test_register_invalid_index() {
        let mut table: FaultTable<'_, 16> = FaultTable::new();
        assert_eq!(table.register(16, 0x1001, 0, 1), Err(FccuError::InvalidIndex));
        assert_eq!(
            table.register(255, 0x1001, 0, 1),
            Err(FccuError::InvalidIndex)
        );
    }

    #[test]
    fn test_register_duplicate_leaves_entry_unchanged() {
        let mut table: FaultTable<'_, 16> = FaultTable::new();
        assert!(table.register(0, 0x1001, 7, 2).is_ok());
        assert_eq!(
            table.register(0, 0x9999, 0, 1),
            Err(FccuError::AlreadyRegistered)
        );
        assert_eq!(table.fault_code(0), Some(0x1001));
        assert_eq!(table.attr(0), Some(7));
    }

    #[test]
    fn test_hook_requires_registration() {
        let mut table: FaultTable<'_, 16> = FaultTable::new();
        assert_eq!(
            table.set_hook(0, &handled_hook),
            Err(FccuError::NotRegistered)
        );

        table.register(0, 0x1001, 0, 1).ok();
        assert!(table.set_hook(0, &handled_hook).is_ok());
        assert!(table.entry(0).hook().is_some());
    }

    #[test]
    fn test_occurrence_counting() {
        let mut table: FaultTable<'_, 16> = FaultTable::new();
        table.register(3, 0x2001, 0, 1).ok();

        assert_eq!(table.entry(3).bump_occurrence(), 0);
        assert_eq!(table.entry(3).bump_occurrence(), 1);
        assert_eq!(table.occurrence(3), 2);

        table.reset_occurrences();
        assert_eq!(table.occurrence(3), 0);
    }
}
