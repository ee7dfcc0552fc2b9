//! Top-level orchestration: clusterer → post-clustering → corrector.
//!
//! Ported from the categorizer's top-level `categorize()` entry point. The
//! driver owns no state across calls beyond what the caller passes in; each
//! call processes one complete flagged duration sequence.

use tracing::debug;

use crate::clusterer::cluster;
use crate::corrector::correct;
use crate::error::CategorizeError;
use crate::post_cluster::post_cluster;
use crate::types::{Classification, Polarity, Sample};

/// Categorizes a full flagged duration sequence: clusters both polarities,
/// runs post-clustering, then the corrector (unless overlap was flagged),
/// mutating `samples` in place for any corrections made.
pub fn categorize(
    samples: &mut [Sample],
    unreliable_count: usize,
) -> Result<Classification, CategorizeError> {
    if samples.len() < 2 {
        return Err(CategorizeError::IndexOutOfBounds);
    }

    let mut high = cluster(samples, Polarity::High)?;
    let mut low = cluster(samples, Polarity::Low)?;

    post_cluster(samples, Polarity::High, &mut high)?;
    post_cluster(samples, Polarity::Low, &mut low)?;

    debug!(
        high_clusters = high.clusters.len(),
        low_clusters = low.clusters.len(),
        high_barrier = ?high.separator_barrier,
        low_barrier = ?low.separator_barrier,
        "clustering and post-clustering complete"
    );

    let mut classification = Classification { high, low };
    correct(samples, &mut classification, unreliable_count)?;

    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_trace(high: &[u16], low: &[u16]) -> Vec<Sample> {
        let mut samples = Vec::new();
        for (&h, &l) in high.iter().zip(low.iter()) {
            samples.push(Sample::new(h, true));
            samples.push(Sample::new(l, true));
        }
        samples
    }

    #[test]
    fn categorizes_a_pure_two_level_trace() {
        let high = vec![400u16; 40];
        let low = vec![1200u16; 40];
        let mut samples = build_trace(&high, &low);
        let classification = categorize(&mut samples, 0).unwrap();
        assert_eq!(classification.high.clusters.len(), 1);
        assert_eq!(classification.low.clusters.len(), 1);
        assert!(classification.high.outliers.is_empty());
    }

    #[test]
    fn rejects_sequences_too_short_for_sentinels() {
        let mut samples = vec![Sample::new(1, true)];
        let result = categorize(&mut samples, 0);
        assert_eq!(result.unwrap_err(), CategorizeError::IndexOutOfBounds);
    }
}
