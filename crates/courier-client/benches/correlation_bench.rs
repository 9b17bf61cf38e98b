// Criterion benchmarks for courier-client
//
// Run benchmarks with:
//   cargo bench -p courier-client
//
// For detailed output with plots:
//   cargo bench -p courier-client -- --save-baseline main

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use courier_client::{CorrelationRegistry, LoadBalance, RoundRobin};
use courier_common::RpcResponse;
use serde_json::json;

fn bench_register_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("register_remove");

    group.bench_function("single", |b| {
        let registry = CorrelationRegistry::new();
        let mut id = 0u64;
        b.iter(|| {
            id += 1;
            let _handle = registry.register(black_box(id), None).unwrap();
            registry.remove(id);
        });
    });

    for backlog in [10usize, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("with_backlog", backlog), backlog, |b, &count| {
            let registry = CorrelationRegistry::new();
            let _pending: Vec<_> = (0..count as u64)
                .map(|id| registry.register(u64::MAX - id, None).unwrap())
                .collect();

            let mut id = 0u64;
            b.iter(|| {
                id += 1;
                let _handle = registry.register(black_box(id), None).unwrap();
                registry.remove(id);
            });
        });
    }

    group.finish();
}

fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete");

    group.bench_function("register_complete_remove", |b| {
        let registry = CorrelationRegistry::new();
        let mut id = 0u64;
        b.iter(|| {
            id += 1;
            let handle = registry.register(id, None).unwrap();
            registry.complete(id, Ok(json!({"ok": true})));
            black_box(handle.is_done());
            registry.remove(id);
        });
    });

    group.bench_function("complete_response", |b| {
        let registry = CorrelationRegistry::new();
        let mut id = 0u64;
        b.iter(|| {
            id += 1;
            let _handle = registry.register(id, None).unwrap();
            registry.complete_response(black_box(RpcResponse::success(id, json!(id))));
            registry.remove(id);
        });
    });

    group.bench_function("late_arrival", |b| {
        let registry = CorrelationRegistry::new();
        b.iter(|| registry.complete(black_box(42), Ok(json!(null))));
    });

    group.finish();
}

fn bench_round_robin(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_robin");

    for node_count in [2, 5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(node_count), node_count, |b, &count| {
            let nodes: BTreeSet<String> = (0..count).map(|i| format!("node{}:7080", i)).collect();
            let lb = RoundRobin::new();
            b.iter(|| black_box(lb.route("com.acme.Greeter#v1", &nodes)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_register_remove, bench_complete, bench_round_robin);
criterion_main!(benches);
