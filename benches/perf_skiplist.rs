//! Criterion benchmark for the core skip-list operations.
//!
//! Run: cargo bench --bench perf_skiplist

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use strata::SkipSet;

const SIZE: usize = 100_000;

fn seeded(rng: &mut SmallRng) -> (SkipSet<u64, SmallRng>, Vec<u64>) {
    let mut keys: Vec<u64> = (0..SIZE as u64).collect();
    keys.shuffle(rng);

    let mut set = SkipSet::new(SmallRng::from_rng(&mut *rng).unwrap());
    for &key in &keys {
        set.add(key);
    }
    (set, keys)
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    group.bench_function("to_tail", |b| {
        let mut set = SkipSet::new(SmallRng::seed_from_u64(12345));
        let mut next = 0u64;
        b.iter(|| {
            set.add(black_box(next));
            next += 1;
        });
    });

    group.bench_function("to_head", |b| {
        let mut set = SkipSet::new(SmallRng::seed_from_u64(12345));
        let mut next = u64::MAX;
        b.iter(|| {
            set.add(black_box(next));
            next -= 1;
        });
    });

    group.finish();
}

fn bench_has(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(12345);
    let (set, keys) = seeded(&mut rng);

    let mut i = 0;
    c.bench_function("has", |b| {
        b.iter(|| {
            let key = keys[i % SIZE];
            i += 1;
            black_box(set.has(black_box(&key)))
        });
    });
}

fn bench_successors(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(12345);
    let (set, keys) = seeded(&mut rng);

    for scan in [1usize, 16, 64] {
        let mut i = 0;
        c.bench_function(&format!("successors_{scan}"), |b| {
            b.iter(|| {
                let key = keys[i % SIZE];
                i += 1;
                black_box(set.successors(black_box(&key)).take(scan).count())
            });
        });
    }
}

criterion_group!(benches, bench_add, bench_has, bench_successors);
criterion_main!(benches);
