//! End-to-end collector scenarios.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use fccu::prelude::*;
use fccu::FaultEvent;

type TestCollector<'h> = FaultCollector<'h, 16, 8, 4, 4>;

fn handled_hook(_event: &FaultEvent) -> HookAction {
    HookAction::Handled
}

fn defer_hook(_event: &FaultEvent) -> HookAction {
    HookAction::Defer
}

#[test]
fn test_basic_handled_round_trip() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &handled_hook).unwrap();

    c.report(0, 0xAA, FaultPriority::Medium).unwrap();
    assert!(c.is_fault_active(0));
    assert_eq!(c.active_fault_count(), 1);

    assert_eq!(c.drain(), 1);
    assert!(!c.is_fault_active(0));
    assert_eq!(c.global_hsm().state(), GlobalState::Idle);
}

#[test]
fn test_defer_keeps_active() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &defer_hook).unwrap();

    c.report(0, 0, FaultPriority::Medium).unwrap();
    assert_eq!(c.drain(), 1);

    assert!(c.is_fault_active(0));
    assert_eq!(c.statistics().total_processed, 1);
}

#[test]
fn test_escalate_then_handle() {
    let calls = AtomicU32::new(0);
    let seen_priorities = Mutex::new(Vec::new());
    let hook = |event: &FaultEvent| {
        seen_priorities.lock().unwrap().push(event.priority);
        if calls.fetch_add(1, Ordering::Relaxed) == 0 {
            HookAction::Escalate
        } else {
            HookAction::Handled
        }
    };

    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &hook).unwrap();

    c.report(0, 0, FaultPriority::Medium).unwrap();
    c.drain();
    c.drain();

    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert!(!c.is_fault_active(0));
    // The escalated entry re-enters one level higher.
    assert_eq!(
        *seen_priorities.lock().unwrap(),
        [FaultPriority::Medium, FaultPriority::High]
    );
}

#[test]
fn test_critical_drives_degraded() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &defer_hook).unwrap();

    c.report(0, 0, FaultPriority::Critical).unwrap();
    assert_eq!(c.global_hsm().state(), GlobalState::Degraded);
}

#[test]
fn test_admission_denial_on_low_priority() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &defer_hook).unwrap();

    for i in 0..5u32 {
        assert!(c.report(0, i, FaultPriority::Low).is_ok());
    }
    assert_eq!(
        c.report(0, 0xFF, FaultPriority::Low),
        Err(FccuError::QueueFull)
    );

    let stats = c.statistics();
    assert_eq!(stats.total_reported, 5);
    assert_eq!(stats.total_dropped, 1);
    assert_eq!(stats.priority_dropped[3], 1);
}

#[test]
fn test_critical_admitted_until_physically_full() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &defer_hook).unwrap();

    for i in 0..8u32 {
        assert!(c.report(0, i, FaultPriority::Critical).is_ok());
    }
    assert_eq!(
        c.report(0, 0xFF, FaultPriority::Critical),
        Err(FccuError::QueueFull)
    );
}

#[test]
fn test_strict_priority_across_levels() {
    let order = Mutex::new(Vec::new());
    let hook = |event: &FaultEvent| {
        order.lock().unwrap().push(event.fault_index);
        HookAction::Handled
    };

    let mut c = TestCollector::new();
    for index in 0..4u16 {
        c.register_fault(index, 0x1000 + u32::from(index), 0, 1).unwrap();
        c.register_hook(index, &hook).unwrap();
    }

    // Report in inverse priority order; drain must honor priority anyway.
    c.report(0, 0, FaultPriority::Low).unwrap();
    c.report(1, 0, FaultPriority::Medium).unwrap();
    c.report(2, 0, FaultPriority::High).unwrap();
    c.report(3, 0, FaultPriority::Critical).unwrap();

    assert_eq!(c.drain(), 4);
    assert_eq!(*order.lock().unwrap(), [3, 2, 1, 0]);
}

#[test]
fn test_fifo_within_one_level() {
    let details = Mutex::new(Vec::new());
    let hook = |event: &FaultEvent| {
        details.lock().unwrap().push(event.detail);
        HookAction::Handled
    };

    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &hook).unwrap();

    for i in 0..5u32 {
        c.report(0, i, FaultPriority::Medium).unwrap();
    }
    c.drain();

    assert_eq!(*details.lock().unwrap(), [0, 1, 2, 3, 4]);
}

#[test]
fn test_recent_ring_reflects_most_recent_16() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &handled_hook).unwrap();

    for i in 0..20u32 {
        c.report(0, i, FaultPriority::Critical).unwrap();
        c.drain();
    }

    let mut seen = Vec::new();
    c.for_each_recent(RECENT_RING_SIZE, |info| seen.push(info.detail));

    let expected: Vec<u32> = (4..20).rev().collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_bus_notifier_sees_every_event() {
    let notified = Mutex::new(Vec::new());
    let notifier = |event: &FaultEvent| {
        notified
            .lock()
            .unwrap()
            .push((event.fault_index, event.occurrence_count, event.is_first));
    };

    let mut c = TestCollector::new();
    c.register_fault(2, 0x2002, 0, 1).unwrap();
    c.register_hook(2, &defer_hook).unwrap();
    c.set_bus_notifier(Some(&notifier));

    c.report(2, 0, FaultPriority::Medium).unwrap();
    c.report(2, 1, FaultPriority::Medium).unwrap();
    c.drain();

    assert_eq!(*notified.lock().unwrap(), [(2, 1, true), (2, 2, false)]);
}

#[test]
fn test_reporter_as_injection_seam() {
    let mut c = TestCollector::new();
    c.register_fault(0, 0x1001, 0, 1).unwrap();
    c.register_hook(0, &handled_hook).unwrap();

    let reporter = c.reporter();
    reporter.report(0, 0xBEEF, FaultPriority::Medium);

    assert!(c.is_fault_active(0));
    c.drain();
    assert!(!c.is_fault_active(0));
}
