//! Basic collector demo: register faults, set hooks, report at different
//! priorities, drain, query and clear.

use fccu::prelude::*;
use fccu::FaultEvent;

fn priority_hook(event: &FaultEvent) -> HookAction {
    println!(
        "  [hook] fault_index={} code={:#06x} detail={:#x} pri={} count={}{}",
        event.fault_index,
        event.fault_code,
        event.detail,
        event.priority,
        event.occurrence_count,
        if event.is_first { " (first)" } else { "" }
    );

    if event.priority == FaultPriority::Critical {
        println!("  [hook] critical fault -> defer for manual review");
        return HookAction::Defer;
    }
    HookAction::Handled
}

fn default_hook(event: &FaultEvent) -> HookAction {
    println!(
        "  [default] fault_index={} code={:#06x} -> handled",
        event.fault_index, event.fault_code
    );
    HookAction::Handled
}

fn main() -> FccuResult<()> {
    let on_overflow = |fault_index: u16, priority: FaultPriority| {
        println!("  [overflow] fault_index={fault_index} pri={priority} dropped");
    };

    // 16 fault points, 8-deep queues, 4 priority levels, 4 HSM slots.
    let mut collector: FaultCollector<'_, 16, 8, 4, 4> = FaultCollector::new();

    collector.register_fault(0, 0x1001, 0, 1)?; // temperature sensor
    collector.register_fault(1, 0x1002, 0, 1)?; // voltage monitor
    collector.register_fault(2, 0x2001, 0, 3)?; // communication timeout

    collector.register_hook(0, &priority_hook)?;
    collector.register_hook(1, &priority_hook)?;
    collector.register_hook(2, &priority_hook)?;
    collector.set_default_hook(Some(&default_hook));
    collector.set_overflow_hook(Some(&on_overflow));

    collector.bind_fault_hsm(0, 1)?;

    println!("--- reporting faults ---");
    collector.report(0, 0xDEAD, FaultPriority::Critical)?;
    collector.report(1, 0xBEEF, FaultPriority::High)?;
    collector.report(2, 0x0001, FaultPriority::Low)?;

    println!("\nactive faults before drain: {}", collector.active_fault_count());
    println!("global state: {}", collector.global_hsm().state_name());
    println!("backpressure: {}\n", collector.backpressure_level());

    println!("--- draining ---");
    let processed = collector.drain();
    println!("\nprocessed {processed} faults");

    println!("\nactive faults after drain: {}", collector.active_fault_count());
    println!(
        "fault 0 active: {} (deferred)",
        collector.is_fault_active(0)
    );
    println!("fault 1 active: {} (handled)", collector.is_fault_active(1));
    println!("global state: {}\n", collector.global_hsm().state_name());

    let stats = collector.statistics();
    println!(
        "stats: reported={} processed={} dropped={}",
        stats.total_reported, stats.total_processed, stats.total_dropped
    );

    println!("\n--- recent faults (newest first) ---");
    collector.for_each_recent(RECENT_RING_SIZE, |info| {
        println!(
            "  fault_index={} detail={:#x} pri={} t={}us",
            info.fault_index, info.detail, info.priority, info.timestamp_us
        );
    });

    collector.clear_all_faults();
    println!(
        "\nafter clear_all: active={} state={}",
        collector.active_fault_count(),
        collector.global_hsm().state_name()
    );

    Ok(())
}
