use bitfloat::{FloatValue, Semantics, FP32, FP64};

fn test_from_f64() {
    for i in 0..100 {
        let val = f64::from(i) * 1.37 - 50.;
        black_box(FloatValue::from_f64(FP64, black_box(val)));
    }
}

fn test_as_f64() {
    let x = FloatValue::from_f64(FP32, 1234.5678);
    for _ in 0..100 {
        black_box(black_box(x).as_f64());
    }
}

fn test_harmonic_sum() {
    let sem = Semantics::new(11, 40).unwrap();
    let mut sum = FloatValue::zero(sem);
    for i in 1..200 {
        let term = FloatValue::from_f64(sem, 1. / f64::from(i));
        sum = sum + term;
    }
    black_box(sum);
}

fn test_cancellation() {
    let sem = Semantics::new(8, 15).unwrap();
    let big = FloatValue::from_f64(sem, 1e30);
    let small = FloatValue::from_f64(sem, 1e-30);
    for _ in 0..100 {
        black_box((black_box(big) + small) - big);
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("test_from_f64", |b| b.iter(test_from_f64));
    c.bench_function("test_as_f64", |b| b.iter(test_as_f64));
    c.bench_function("test_harmonic_sum", |b| b.iter(test_harmonic_sum));
    c.bench_function("test_cancellation", |b| b.iter(test_cancellation));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
