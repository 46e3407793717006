use ddfloat::{
    evaluate_fraction, sum_series, DDFloat, FnFraction, FractionConfig,
    SeriesConfig,
};

fn test_parse_format() {
    let a = DDFloat::parse("3.14159265358979323846264338327950").unwrap();
    black_box(a.to_string());
}

fn test_sqrt() {
    for i in 1..100 {
        black_box(DDFloat::from(i).sqrt());
    }
}

fn test_root_n() {
    let x = DDFloat::from(1234567);
    for n in 2..20 {
        black_box(x.root_n(n));
    }
}

fn test_exp_ln() {
    for i in -50..50 {
        let x = DDFloat::from_f64(i as f64 * 0.37);
        black_box(x.exp().ln());
    }
}

fn test_series() {
    // The Taylor series of e.
    let terms = (1..).scan(DDFloat::ONE, |t, n: u32| {
        let cur = *t;
        *t = *t / n as f64;
        Some(cur)
    });
    black_box(sum_series(terms, &SeriesConfig::default()));
}

fn test_fraction() {
    // sqrt(2) = 1 + 1/(2 + 1/(2 + ...))
    let cf = FnFraction::new(DDFloat::ONE, |_| (DDFloat::ONE, DDFloat::TWO));
    black_box(evaluate_fraction(&cf, &FractionConfig::default()));
}

fn test_erf() {
    for i in 0..40 {
        let x = DDFloat::from_f64(i as f64 * 0.15);
        black_box(x.erf() + x.erfc());
    }
}

fn test_gamma() {
    for i in 1..50 {
        let x = DDFloat::from_f64(i as f64 * 0.71);
        black_box(x.gamma());
    }
}

fn test_incomplete_gamma() {
    let a = DDFloat::from_f64(4.5);
    for i in 1..20 {
        let x = DDFloat::from(i);
        black_box(a.gamma_p(&x) + a.gamma_q(&x));
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("test_parse_format", |b| b.iter(test_parse_format));
    c.bench_function("test_sqrt", |b| b.iter(test_sqrt));
    c.bench_function("test_root_n", |b| b.iter(test_root_n));
    c.bench_function("test_exp_ln", |b| b.iter(test_exp_ln));
    c.bench_function("test_series", |b| b.iter(test_series));
    c.bench_function("test_fraction", |b| b.iter(test_fraction));
    c.bench_function("test_erf", |b| b.iter(test_erf));
    c.bench_function("test_gamma", |b| b.iter(test_gamma));
    c.bench_function("test_incomplete_gamma", |b| {
        b.iter(test_incomplete_gamma)
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
