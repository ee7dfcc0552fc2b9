//! Corrector: merged-outlier reclassification and untrusted-subsequence
//! repair.
//!
//! Ported from the categorizer's correction phase, which runs after both
//! polarities have been clustered and post-processed, provided neither
//! polarity raised the overlap flag.

use tracing::{trace, warn};

use crate::aggregator::aggregate;
use crate::classifier::classify;
use crate::config::ClassifyOption;
use crate::error::CategorizeError;
use crate::extractor::{Extractor, Window};
use crate::helpers::merge_sorted;
use crate::resorber::resorb;
use crate::types::{CategorySet, Classification, Polarity, Sample};

/// Runs the corrector over both polarities. Skipped (returns `Ok(())`
/// without mutating anything) if either polarity's overlap flag is set.
pub fn correct(
    samples: &mut [Sample],
    classification: &mut Classification,
    unreliable_count: usize,
) -> Result<(), CategorizeError> {
    if classification.high.overlap || classification.low.overlap {
        warn!("overlap flag raised; corrector suppressed for this trace");
        return Ok(());
    }

    merged_outlier_pass(samples, classification)?;

    if unreliable_count > 0 {
        untrusted_subsequence_pass(samples, classification)?;
    }

    Ok(())
}

fn polarity_of(index: usize) -> Polarity {
    Polarity::of_index(index)
}

/// 4.6.1: merges the two polarities' outlier-index lists, scans from the
/// top down reclassifying resistant-vs-correctable triples, then re-runs
/// the aggregator per polarity with `m = 0` to record level-2 aggregations.
fn merged_outlier_pass(
    samples: &mut [Sample],
    classification: &mut Classification,
) -> Result<(), CategorizeError> {
    let merged = merge_sorted(&classification.high.outliers, &classification.low.outliers);
    let mut keep = vec![true; merged.len()];

    let mut k = merged.len();
    while k > 0 {
        k -= 1;
        let i = merged[k];
        let polarity = polarity_of(i);
        let set = classification.for_polarity(polarity);
        let barrier = set.separator_barrier.unwrap_or(u16::MAX);
        let v = samples[i].value();

        if v > barrier {
            trace!(index = i, "top-outlier, left in place");
            continue;
        }
        if i == 0 || i + 1 >= samples.len() {
            continue;
        }

        let set = classification.for_polarity(polarity);
        let Some(c_i) = classify(set, v, ClassifyOption::Loose) else {
            continue;
        };
        let v_prev = samples[i - 1].value();
        let v_next = samples[i + 1].value();
        let c_prev = classify(set, v_prev, ClassifyOption::Loose);
        let c_next = classify(set, v_next, ClassifyOption::Loose);

        let flag = c_i.near
            || (c_prev.map(|c| c.near).unwrap_or(false) && c_next.map(|c| c.near).unwrap_or(false));

        let sum: u32 = u32::from(v_prev) + u32::from(v) + u32::from(v_next);
        let resistant_fit = u32::from(c_prev.map(|c| c.center).unwrap_or(v_prev))
            + u32::from(v)
            + u32::from(c_next.map(|c| c.center).unwrap_or(v_next));
        let correctable_fit = u32::from(c_prev.map(|c| c.center).unwrap_or(v_prev))
            + u32::from(c_i.center)
            + u32::from(c_next.map(|c| c.center).unwrap_or(v_next));

        let rel_delta_resistant = if sum == 0 { 0 } else { 1000 * sum.abs_diff(resistant_fit) / sum };
        let rel_delta_correctable =
            if sum == 0 { 0 } else { 1000 * sum.abs_diff(correctable_fit) / sum };

        if !flag || rel_delta_resistant < rel_delta_correctable {
            trace!(index = i, "resistant outlier, kept");
            continue;
        }

        trace!(index = i, "correctable outlier, overwritten with category centers");
        if let Some(c) = c_prev {
            samples[i - 1] = Sample::new(c.center, true);
        }
        samples[i] = Sample::new(c_i.center, true);
        if let Some(c) = c_next {
            samples[i + 1] = Sample::new(c.center, true);
        }
        keep[k] = false;
        if k > 0 && merged[k - 1] == i - 1 {
            keep[k - 1] = false;
        }
    }

    let remaining: Vec<usize> = merged
        .iter()
        .zip(keep.iter())
        .filter(|&(_, &k)| k)
        .map(|(&i, _)| i)
        .collect();

    classification.high.outliers = remaining.iter().copied().filter(|&i| polarity_of(i) == Polarity::High).collect();
    classification.low.outliers = remaining.iter().copied().filter(|&i| polarity_of(i) == Polarity::Low).collect();

    for polarity in [Polarity::High, Polarity::Low] {
        let set = classification.for_polarity_mut(polarity);
        let mut outliers = set.outliers.clone();
        let aggregations = aggregate(&mut outliers, |i| samples[i].value(), 0)?;
        set.aggregations = aggregations;
    }

    Ok(())
}

/// 4.6.2: walks untrusted windows. Each window first promotes any
/// above-barrier element into its polarity's outlier list and re-runs the
/// aggregator, then every element is classified under
/// [`ClassifyOption::Medium`]; if all of them land near a category, each is
/// overwritten with its own nearest center. Otherwise a 5-element window
/// tries resorbing its central triple before falling back to the same
/// per-element best-fit; a 4-element window always falls back to it, since
/// there is no central triple to resorb.
fn untrusted_subsequence_pass(
    samples: &mut [Sample],
    classification: &mut Classification,
) -> Result<(), CategorizeError> {
    let mut extractor = Extractor::new(samples);
    let mut windows = Vec::new();
    while let Some(window) = extractor.next_window() {
        windows.push(window);
    }

    for window in windows {
        let len = window.len();
        if len != 4 && len != 5 {
            return Err(CategorizeError::SubsequenceLengthError);
        }

        promote_top_outliers(samples, classification, window)?;

        let indices: Vec<usize> = (window.start..=window.stop).collect();
        let values: Vec<u16> = indices.iter().map(|&i| samples[i].value()).collect();

        let classified: Vec<_> = indices
            .iter()
            .map(|&i| {
                let set = classification.for_polarity(polarity_of(i));
                classify(set, samples[i].value(), ClassifyOption::Medium)
            })
            .collect();

        let flag = classified.iter().all(|c| c.map(|c| c.near).unwrap_or(false));
        let centers: Vec<u16> = classified
            .iter()
            .zip(values.iter())
            .map(|(c, &v)| c.map(|c| c.center).unwrap_or(v))
            .collect();

        let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
        let center_sum: u32 = centers.iter().map(|&c| u32::from(c)).sum();
        let rel_delta_bestfit = if sum == 0 { 0 } else { 1000 * sum.abs_diff(center_sum) / sum };

        if flag {
            overwrite_with_centers(samples, &indices, &centers);
            continue;
        }

        if len == 5 {
            let middle_polarity = polarity_of(window.start + 2);
            let set = classification.for_polarity(middle_polarity);

            let cat_a = centers[0];
            let cat_last = centers[4];
            let resorbed = resorb(
                set,
                (values[0], values[1], values[2], values[3], values[4]),
                (cat_a, cat_last),
                rel_delta_bestfit,
            )?;

            match resorbed {
                Some(resorption) => {
                    samples[window.start] = Sample::new(cat_a, true);
                    samples[window.start + 1] = Sample::new(resorption.center, true);
                    samples[window.start + 2] = Sample::new(0, true);
                    samples[window.start + 3] = Sample::new(0, true);
                    samples[window.stop] = Sample::new(cat_last, true);

                    let set_mut = classification.for_polarity_mut(middle_polarity);
                    if resorption.index >= set_mut.clusters.len() {
                        set_mut.push_outlier(window.start + 1)?;
                    }
                }
                None => overwrite_with_centers(samples, &indices, &centers),
            }
        } else {
            overwrite_with_centers(samples, &indices, &centers);
        }
    }

    Ok(())
}

fn overwrite_with_centers(samples: &mut [Sample], indices: &[usize], centers: &[u16]) {
    for (&i, &center) in indices.iter().zip(centers.iter()) {
        samples[i] = Sample::new(center, true);
    }
}

/// 4.6.2 step 1: appends every window element above its polarity's
/// separator barrier to that polarity's outlier list and re-runs the
/// aggregator for any polarity touched, before best-fit evaluation begins.
fn promote_top_outliers(
    samples: &[Sample],
    classification: &mut Classification,
    window: Window,
) -> Result<(), CategorizeError> {
    let mut high_touched = false;
    let mut low_touched = false;

    for i in window.start..=window.stop {
        let polarity = polarity_of(i);
        let set = classification.for_polarity(polarity);
        let barrier = set.separator_barrier.unwrap_or(u16::MAX);
        if samples[i].value() > barrier {
            classification.for_polarity_mut(polarity).push_outlier(i)?;
            match polarity {
                Polarity::High => high_touched = true,
                Polarity::Low => low_touched = true,
            }
        }
    }

    if high_touched {
        rerun_aggregator(samples, classification.for_polarity_mut(Polarity::High))?;
    }
    if low_touched {
        rerun_aggregator(samples, classification.for_polarity_mut(Polarity::Low))?;
    }
    Ok(())
}

fn rerun_aggregator(samples: &[Sample], set: &mut CategorySet) -> Result<(), CategorizeError> {
    let mut outliers = set.outliers.clone();
    set.aggregations = aggregate(&mut outliers, |i| samples[i].value(), 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cluster;

    fn set_with_clusters() -> CategorySet {
        let mut set = CategorySet::default();
        set.push_cluster(Cluster { floor: 350, ceil: 450, center: 400, size: 10 }).unwrap();
        set.push_cluster(Cluster { floor: 900, ceil: 1000, center: 950, size: 10 }).unwrap();
        set.separator_barrier = Some(5000);
        set
    }

    #[test]
    fn corrector_skipped_when_overlap_flagged() {
        let mut samples = vec![Sample::new(400, true); 10];
        let mut classification = Classification {
            high: set_with_clusters(),
            low: set_with_clusters(),
        };
        classification.high.overlap = true;
        let before = samples.clone();
        correct(&mut samples, &mut classification, 0).unwrap();
        assert_eq!(samples, before);
    }

    #[test]
    fn untrusted_subsequence_pass_requires_legal_window_length() {
        // window of length 6 is illegal; build a sequence with 6 consecutive
        // unreliable samples bracketed by reliable ones.
        let mut samples = vec![Sample::new(400, true); 2];
        samples.push(Sample::new(400, false));
        for _ in 0..4 {
            samples.push(Sample::new(400, false));
        }
        samples.push(Sample::new(400, false));
        samples.push(Sample::new(400, true));
        let mut classification = Classification { high: set_with_clusters(), low: set_with_clusters() };
        let result = correct(&mut samples, &mut classification, 1);
        assert_eq!(result, Err(CategorizeError::SubsequenceLengthError));
    }
}
