//! Criterion micro-benchmarks for graph construction.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessel_alloc::{HeapAllocator, StackAllocator};
use tessel_bench::star_graph;
use tessel_graph::NodeId;

/// Benchmark: 64-spoke star on the heap (old hub arrays are freed).
fn bench_star_heap_64(c: &mut Criterion) {
    let heap = HeapAllocator::new();
    c.bench_function("star_heap_64", |b| {
        b.iter(|| {
            let g = star_graph(&heap, 64).unwrap();
            black_box(g.degree(NodeId(0)).unwrap());
        });
    });
}

/// Benchmark: 64-spoke star on an arena (old hub arrays are abandoned).
fn bench_star_arena_64(c: &mut Criterion) {
    let mut buf = vec![0u8; 64 * 1024];
    let mut arena = StackAllocator::new(&mut buf);
    c.bench_function("star_arena_64", |b| {
        b.iter(|| {
            {
                let g = star_graph(&arena, 64).unwrap();
                black_box(g.degree(NodeId(0)).unwrap());
            }
            arena.reset();
        });
    });
}

criterion_group!(benches, bench_star_heap_64, bench_star_arena_64);
criterion_main!(benches);
