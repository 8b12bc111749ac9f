//! # Slot Arena Benchmark
//!
//! Measures create/remove churn and validity checks on a warm arena.
//!
//! Run with: `cargo bench --package tessera_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{AnimatorDataHandle, SlotArena};

/// Benchmark: fill an empty arena.
fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_fill");

    for count in [1_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut arena: SlotArena<AnimatorDataHandle, u64> = SlotArena::new();
                for i in 0..count {
                    black_box(arena.create(i).unwrap());
                }
                arena.capacity()
            });
        });
    }

    group.finish();
}

/// Benchmark: steady-state churn through the free list.
fn bench_churn(c: &mut Criterion) {
    let mut arena: SlotArena<AnimatorDataHandle, u64> = SlotArena::new();
    let mut handles: Vec<_> = (0..10_000).map(|i| arena.create(i).unwrap()).collect();

    c.bench_function("arena_churn_10k", |b| {
        let mut cursor = 0;
        b.iter(|| {
            let handle = handles[cursor];
            arena.remove(handle);
            handles[cursor] = arena.create(cursor as u64).unwrap();
            cursor = (cursor + 1) % handles.len();
        });
    });
}

/// Benchmark: validity checks over a mix of live and stale handles.
fn bench_is_valid(c: &mut Criterion) {
    let mut arena: SlotArena<AnimatorDataHandle, u64> = SlotArena::new();
    let handles: Vec<_> = (0..10_000).map(|i| arena.create(i).unwrap()).collect();
    for handle in handles.iter().step_by(2) {
        arena.remove(*handle);
    }

    c.bench_function("arena_is_valid_10k", |b| {
        b.iter(|| handles.iter().filter(|&&h| arena.is_valid(black_box(h))).count());
    });
}

criterion_group!(benches, bench_fill, bench_churn, bench_is_valid);
criterion_main!(benches);
