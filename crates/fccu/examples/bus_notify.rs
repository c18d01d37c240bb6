//! Bus notification demo: forward every processed fault event to an
//! external notification queue through the bus-notifier injection point.

use std::sync::Mutex;

use fccu::prelude::*;
use fccu::FaultEvent;

/// Message shape carried on the external bus.
#[derive(Debug, Clone, Copy)]
struct FaultNotification {
    fault_index: u16,
    fault_code: u32,
    detail: u32,
    priority: FaultPriority,
    timestamp_us: u64,
}

fn simple_hook(_event: &FaultEvent) -> HookAction {
    HookAction::Handled
}

fn main() -> FccuResult<()> {
    // Stand-in for the asynchronous message bus: the notifier publishes,
    // the main loop consumes after the drain.
    let bus: Mutex<Vec<FaultNotification>> = Mutex::new(Vec::new());

    let notifier = |event: &FaultEvent| {
        let msg = FaultNotification {
            fault_index: event.fault_index,
            fault_code: event.fault_code,
            detail: event.detail,
            priority: event.priority,
            timestamp_us: event.timestamp_us,
        };
        bus.lock().unwrap().push(msg);
    };

    let mut collector: FaultCollector<'_, 16, 8, 4, 4> = FaultCollector::new();
    collector.register_fault(0, 0x3001, 0, 1)?;
    collector.register_fault(1, 0x3002, 0, 1)?;
    collector.register_hook(0, &simple_hook)?;
    collector.register_hook(1, &simple_hook)?;
    collector.set_bus_notifier(Some(&notifier));

    println!("--- reporting ---");
    collector.report(0, 0x10, FaultPriority::High)?;
    collector.report(1, 0x20, FaultPriority::Medium)?;
    collector.report(0, 0x11, FaultPriority::High)?;

    let processed = collector.drain();
    println!("processed {processed} faults\n");

    println!("--- bus messages ---");
    for msg in bus.lock().unwrap().iter() {
        println!(
            "  fault_index={} code={:#06x} detail={:#x} pri={} t={}us",
            msg.fault_index, msg.fault_code, msg.detail, msg.priority, msg.timestamp_us
        );
    }

    Ok(())
}
