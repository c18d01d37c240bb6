//! Benchmarks for collector hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fccu::prelude::*;
use fccu::FaultEvent;

fn defer_hook(_event: &FaultEvent) -> HookAction {
    HookAction::Defer
}

fn handled_hook(_event: &FaultEvent) -> HookAction {
    HookAction::Handled
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    group.bench_function("report_and_drain_single", |b| {
        let mut collector: FaultCollector<'_, 64, 32, 4, 8> = FaultCollector::new();
        collector.register_fault(0, 0x1001, 0, 1).ok();
        collector.register_hook(0, &handled_hook).ok();
        b.iter(|| {
            collector
                .report(black_box(0), black_box(0xAA), FaultPriority::Medium)
                .ok();
            collector.drain()
        });
    });

    group.bench_function("report_rejected_unregistered", |b| {
        let collector: FaultCollector<'_, 64, 32, 4, 8> = FaultCollector::new();
        b.iter(|| collector.report(black_box(5), black_box(0), FaultPriority::Medium));
    });

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");

    group.bench_function("drain_32_mixed_priorities", |b| {
        let mut collector: FaultCollector<'_, 64, 32, 4, 8> = FaultCollector::new();
        for index in 0..4u16 {
            collector
                .register_fault(index, 0x1000 + u32::from(index), 0, 1)
                .ok();
            collector.register_hook(index, &defer_hook).ok();
        }
        b.iter(|| {
            for i in 0..8u32 {
                collector.report(0, i, FaultPriority::Critical).ok();
                collector.report(1, i, FaultPriority::High).ok();
                collector.report(2, i, FaultPriority::Medium).ok();
                collector.report(3, i, FaultPriority::Low).ok();
            }
            collector.drain()
        });
    });

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    let mut collector: FaultCollector<'_, 64, 32, 4, 8> = FaultCollector::new();
    collector.register_fault(0, 0x1001, 0, 1).ok();
    collector.register_hook(0, &defer_hook).ok();
    collector.report(0, 0, FaultPriority::Medium).ok();
    collector.drain();

    group.bench_function("is_fault_active", |b| {
        b.iter(|| collector.is_fault_active(black_box(0)));
    });

    group.bench_function("active_fault_count", |b| {
        b.iter(|| collector.active_fault_count());
    });

    group.bench_function("statistics_snapshot", |b| {
        b.iter(|| collector.statistics());
    });

    group.bench_function("backpressure_level", |b| {
        b.iter(|| collector.backpressure_level());
    });

    group.finish();
}

criterion_group!(benches, bench_report, bench_drain, bench_queries);
criterion_main!(benches);
