//! Comparison engine benchmarks.

use std::borrow::Cow;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rspect_core::ByteView;
use rspect_core::compare;

struct Blob(Vec<u8>);

impl ByteView for Blob {
    fn bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }
}

fn bench_strict_equal_buffers(c: &mut Criterion) {
    let sizes: &[usize] = &[16, 256, 4096, 65536];
    let mut group = c.benchmark_group("strict_equal_buffer");

    for &size in sizes {
        let a = vec![0x5Au8; size];
        let b = a.clone();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("u8", size), &size, |bench, _| {
            bench.iter(|| {
                let assertion = compare::to_strict_equal(&black_box(&a[..]), &black_box(&b[..]), false);
                black_box(assertion.passed);
            });
        });
    }
    group.finish();
}

fn bench_strict_equal_objects(c: &mut Criterion) {
    let sizes: &[usize] = &[64, 1024, 16384];
    let mut group = c.benchmark_group("strict_equal_object");

    for &size in sizes {
        let a = Rc::new(Blob(vec![1; size]));
        let b = Rc::new(Blob(vec![1; size]));
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("rc", size), &size, |bench, _| {
            bench.iter(|| black_box(compare::to_strict_equal(&a, &b, false).passed));
        });
    }
    group.finish();
}

fn bench_scalar_assertions(c: &mut Criterion) {
    c.bench_function("to_be_i64", |b| {
        b.iter(|| black_box(compare::to_be(&black_box(42i64), &black_box(42i64), false).passed));
    });
    c.bench_function("to_be_close_to_f64", |b| {
        b.iter(|| {
            black_box(compare::to_be_close_to(&black_box(1.0f64), &black_box(1.001f64), 2, false).passed)
        });
    });
    c.bench_function("to_be_greater_than_nan_guard", |b| {
        b.iter(|| black_box(compare::to_be_greater_than(&black_box(f64::NAN), &1.0, true).passed));
    });
}

criterion_group!(
    benches,
    bench_strict_equal_buffers,
    bench_strict_equal_objects,
    bench_scalar_assertions
);
criterion_main!(benches);
