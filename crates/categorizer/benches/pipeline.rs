use categorizer::{categorize, Sample};
use criterion::{criterion_group, criterion_main, Criterion};

fn build_trace() -> Vec<Sample> {
    let mut samples = Vec::new();
    for _ in 0..40 {
        samples.push(Sample::new(400, true));
        samples.push(Sample::new(1200, true));
    }
    for _ in 0..40 {
        samples.push(Sample::new(800, true));
        samples.push(Sample::new(1200, true));
    }
    samples
}

fn bench_categorize(c: &mut Criterion) {
    c.bench_function("categorize_multi_cluster_trace", |b| {
        b.iter_batched(
            build_trace,
            |mut samples| categorize(&mut samples, 0).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_categorize);
criterion_main!(benches);
