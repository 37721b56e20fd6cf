//! Memo read paths compared with the std lazy primitives.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use memo::{Memo, SyncMemo};
use std::cell::LazyCell;
use std::sync::{Arc, LazyLock};

// Enough reads per iteration to keep the cached path out of timer noise.
const READS: usize = 1024;

fn expensive() -> u64 {
    (0..256u64).fold(0, |acc, i| acc.wrapping_mul(31).wrapping_add(i))
}

fn bench_first_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo_first_read");

    group.bench_function("memo", |b| {
        b.iter_batched(
            || Memo::new(expensive),
            |memo| black_box(memo.value()),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("sync_memo", |b| {
        b.iter_batched(
            || SyncMemo::new(expensive),
            |memo| black_box(memo.value()),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("std_lazy_cell", |b| {
        b.iter_batched(
            || LazyCell::new(expensive),
            |lazy| black_box(*lazy),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_cached_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo_cached_read");

    let memo = Memo::new(expensive);
    memo.value();
    group.bench_function("memo_value", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for _ in 0..READS {
                acc = acc.wrapping_add(black_box(&memo).value());
            }
            acc
        })
    });

    let memo = SyncMemo::new(expensive);
    memo.value();
    group.bench_function("sync_memo_value", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for _ in 0..READS {
                acc = acc.wrapping_add(black_box(&memo).value());
            }
            acc
        })
    });

    let lazy = LazyCell::new(expensive);
    LazyCell::force(&lazy);
    group.bench_function("std_lazy_cell", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for _ in 0..READS {
                acc = acc.wrapping_add(**black_box(&lazy));
            }
            acc
        })
    });

    let lock = LazyLock::new(expensive);
    LazyLock::force(&lock);
    group.bench_function("std_lazy_lock", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for _ in 0..READS {
                acc = acc.wrapping_add(**black_box(&lock));
            }
            acc
        })
    });

    group.finish();
}

fn bench_shared_handles(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo_shared_handles");

    group.bench_function("memo_clone_then_read", |b| {
        b.iter_batched(
            || Memo::new(expensive),
            |memo| {
                let copies: Vec<_> = (0..16).map(|_| memo.clone()).collect();
                copies.iter().map(Memo::value).fold(0u64, u64::wrapping_add)
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("arc_lazy_lock_clone_then_read", |b| {
        b.iter_batched(
            || Arc::new(LazyLock::new(expensive)),
            |lazy| {
                let copies: Vec<_> = (0..16).map(|_| Arc::clone(&lazy)).collect();
                copies.iter().map(|l| ***l).fold(0u64, u64::wrapping_add)
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_first_read, bench_cached_read, bench_shared_handles);
criterion_main!(benches);
