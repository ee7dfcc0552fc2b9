//! Post-clustering pass: border classification, border aggregation, the
//! separator barrier, and the final outlier sort.
//!
//! Ported from the categorizer's second clustering phase, which runs once
//! per polarity after the adaptive histogram loop has produced its
//! clusters.

use crate::aggregator::aggregate;
use crate::classifier::classify;
use crate::config::{ClassifyOption, BORDER_WIDTH, CEIL, MIN_SIZE, SEPARATOR_BARRIER_MULTIPLIER};
use crate::error::CategorizeError;
use crate::helpers::insertion_sort_by_key_index;
use crate::types::{CategorySet, Polarity, Sample};

/// Runs border classification, border aggregation, separator-barrier
/// discovery, and the final index sort on `set` in place.
pub fn post_cluster(
    samples: &[Sample],
    polarity: Polarity,
    set: &mut CategorySet,
) -> Result<(), CategorizeError> {
    let indices: Vec<usize> =
        (0..samples.len()).filter(|&i| Polarity::of_index(i) == polarity).collect();

    classify_borders(samples, &indices, set)?;
    aggregate_borders(samples, set)?;
    find_separator_barrier(samples, set);
    insertion_sort_by_key_index(&mut set.outliers, |i| i as u16);
    Ok(())
}

/// Step 1: re-scans the border zones (and any interior value above the
/// separator barrier) and turns unclassifiable reliable values into
/// outliers. The very first HIGH sample (polarity index 0) is exempt.
fn classify_borders(
    samples: &[Sample],
    indices: &[usize],
    set: &mut CategorySet,
) -> Result<(), CategorizeError> {
    if indices.is_empty() {
        return Ok(());
    }

    let leading_end = BORDER_WIDTH.min(indices.len());
    let trailing_start = indices.len().saturating_sub(BORDER_WIDTH);
    let border_positions = (0..leading_end).chain(trailing_start..indices.len());

    for pos in border_positions {
        let idx = indices[pos];
        let sample = samples[idx];
        if !sample.reliable() {
            continue;
        }
        if pos == 0 {
            // the first HIGH sample is explicitly suppressed from becoming
            // an outlier even if unclassifiable.
            continue;
        }
        let classified = classify(set, sample.value(), ClassifyOption::Medium);
        let is_near = classified.map(|c| c.near).unwrap_or(false);
        if !is_near {
            set.push_outlier(idx)?;
        }
    }
    Ok(())
}

/// Step 2: runs the aggregator with `m = MIN_SIZE`, recording the result as
/// the first-pass aggregations, then prunes outliers now classifiable.
fn aggregate_borders(samples: &[Sample], set: &mut CategorySet) -> Result<(), CategorizeError> {
    let mut outliers = set.outliers.clone();
    let aggregations = aggregate(&mut outliers, |i| samples[i].value(), MIN_SIZE)?;
    for aggregation in aggregations {
        set.push_aggregation(aggregation)?;
    }

    set.outliers
        .retain(|&idx| set.find_enclosing(samples[idx].value()).is_none());
    Ok(())
}

/// Step 3: raises the separator barrier to absorb outliers below
/// `10 × barrier`, saturating to `CEIL` if it would otherwise exceed
/// `CEIL / 10`.
fn find_separator_barrier(samples: &[Sample], set: &mut CategorySet) {
    let Some(last_cluster) = set.clusters.last() else {
        return;
    };
    let mut barrier = u32::from(last_cluster.ceil);

    loop {
        let limit = barrier * u32::from(SEPARATOR_BARRIER_MULTIPLIER);
        let candidate = set
            .outliers
            .iter()
            .map(|&i| u32::from(samples[i].value()))
            .filter(|&v| v < limit)
            .max();

        match candidate {
            Some(v) if v > barrier => barrier = v,
            _ => break,
        }

        if barrier >= u32::from(CEIL) / u32::from(SEPARATOR_BARRIER_MULTIPLIER) {
            barrier = u32::from(CEIL);
            break;
        }
    }

    set.separator_barrier = Some(barrier.min(u32::from(u16::MAX)) as u16);
}
