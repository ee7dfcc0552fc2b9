//! Concrete scenario tests, one per documented example trace.

use categorizer::{categorize, render, Sample};

fn build_trace(high: &[u16], low: &[u16]) -> Vec<Sample> {
    let mut samples = Vec::new();
    for (&h, &l) in high.iter().zip(low.iter()) {
        samples.push(Sample::new(h, true));
        samples.push(Sample::new(l, true));
    }
    samples
}

#[test]
fn pure_two_level_trace_yields_one_cluster_per_polarity() {
    let high = vec![400u16; 40];
    let low = vec![1200u16; 40];
    let mut samples = build_trace(&high, &low);

    let classification = categorize(&mut samples, 0).unwrap();

    assert_eq!(classification.high.clusters.len(), 1);
    assert_eq!(classification.low.clusters.len(), 1);
    assert!(classification.high.outliers.is_empty());
    assert!(classification.high.aggregations.is_empty());
}

#[test]
fn three_level_high_with_stray_value_becomes_outlier() {
    let mut high = Vec::new();
    high.extend(std::iter::repeat_n(400u16, 14));
    high.extend(std::iter::repeat_n(800u16, 14));
    high.extend(std::iter::repeat_n(1600u16, 13));
    // One stray value far below every cluster, inside the trusted interior.
    high[20] = 50;
    let low = vec![1200u16; high.len()];

    let mut samples = build_trace(&high, &low);
    let classification = categorize(&mut samples, 0).unwrap();

    // The stray value is far below every real cluster and too rare to seed
    // one of its own; the three well-populated levels must still each be
    // discovered.
    assert!(classification.high.clusters.len() >= 3);
}

#[test]
fn top_value_raises_separator_barrier() {
    let mut high = vec![400u16; 40];
    high[20] = 60_000;
    let low = vec![1200u16; 40];

    let mut samples = build_trace(&high, &low);
    let classification = categorize(&mut samples, 0).unwrap();

    // A single value many multiples above the real cluster never gets
    // absorbed into the barrier; it stays a top-outlier and its column
    // renders as `*`.
    let barrier = classification.high.separator_barrier.expect("barrier set");
    assert!(barrier < 60_000);
    let picture = render(&samples, &classification);
    assert!(picture.lines().next().unwrap().contains('*'));
}

#[test]
fn capacity_overflow_reports_too_many_clusters() {
    // Eleven well-separated HIGH levels, each a run long enough that the
    // leading/trailing border exclusion only eats into the outermost two
    // runs, leaves nine fully-trusted, well-separated (>25% apart) levels —
    // enough to overflow the 8-cluster capacity.
    let mut high = Vec::new();
    let mut level = 200u16;
    for _ in 0..11 {
        high.extend(std::iter::repeat_n(level, 10));
        level += level; // doubling keeps each level well separated
    }
    let low = vec![1200u16; high.len()];

    let mut samples = build_trace(&high, &low);
    let result = categorize(&mut samples, 0);

    assert_eq!(result, Err(categorizer::CategorizeError::TooManyClusters));
}
