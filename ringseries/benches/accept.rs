//! Microbenchmarks for the `accept()` hot path and view reads.
//!
//! Run with: `cargo bench -p ringseries -- accept`

#![allow(missing_docs, clippy::cast_precision_loss)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ringseries::{DoubleRingBuffer, IntRingBuffer, RingBuffer};

fn bench_accept_numeric(c: &mut Criterion) {
    let ints = IntRingBuffer::new(1024).unwrap();
    let doubles = DoubleRingBuffer::new(1000).unwrap();
    let mut n = 0i32;

    c.bench_function("accept/i32", |b| {
        b.iter(|| {
            n = n.wrapping_add(1);
            ints.accept(black_box(n));
        });
    });

    c.bench_function("accept/f64", |b| {
        b.iter(|| {
            n = n.wrapping_add(1);
            doubles.accept(black_box(f64::from(n)));
        });
    });
}

fn bench_accept_string(c: &mut Criterion) {
    let ring = RingBuffer::<String>::new(256).unwrap();
    let value = "tick".to_string();

    c.bench_function("accept/string", |b| {
        b.iter(|| ring.accept(black_box(value.clone())));
    });
}

fn bench_get_by_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("get/capacity");

    for capacity in [16usize, 300, 4096] {
        let ring = DoubleRingBuffer::new(capacity).unwrap();
        ring.add_all((0..capacity * 2).map(|i| i as f64));

        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
            b.iter(|| {
                let mut sum = 0.0;
                for offset in 0..cap {
                    sum += ring.get(black_box(offset)).unwrap();
                }
                sum
            });
        });
    }

    group.finish();
}

fn bench_dataset_views(c: &mut Criterion) {
    let ring = Arc::new(DoubleRingBuffer::new(300).unwrap());
    ring.add_all((0..600).map(f64::from));
    let crossings = ring.dataset().drop(1).crosses_over(450.0);

    c.bench_function("dataset/crosses_over_300", |b| {
        b.iter(|| crossings.to_vec().unwrap());
    });

    c.bench_function("dataset/fdi_30", |b| {
        let data = ring.dataset();
        b.iter(|| data.fdi(black_box(30), 0).unwrap());
    });
}

criterion_group!(
    benches,
    bench_accept_numeric,
    bench_accept_string,
    bench_get_by_capacity,
    bench_dataset_views,
);
criterion_main!(benches);
