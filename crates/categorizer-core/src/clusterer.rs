//! Adaptive-bin histogram clusterer.
//!
//! Ported from the categorizer's multi-pass histogram loop: each pass bins
//! the trusted interior of one polarity's duration values at a bin width
//! that doubles whenever the previous pass's leftover range demands finer
//! coverage further up the dynamic range, so that a handful of clusters
//! spanning three orders of magnitude can be found in a small, fixed-size
//! bin table.

use tracing::{debug, trace};

use crate::config::{
    BORDER_WIDTH, CEIL, FIRST_HITS, INITIAL_W2, MAX_HOLES, MIN_SIZE, NB, OVERLAP_MIN_RUN_LEN,
    OVERLAP_RISE_THRESHOLD,
};
use crate::error::CategorizeError;
use crate::types::{CategorySet, Cluster, Polarity, Sample};

/// Runs the adaptive histogram loop for one polarity and returns the
/// resulting [`CategorySet`] (clusters, first-pass outliers, and the
/// overlap flag). Post-clustering (border classification, separator
/// barrier) is a separate stage; see `post_cluster`.
pub fn cluster(samples: &[Sample], polarity: Polarity) -> Result<CategorySet, CategorizeError> {
    let indices: Vec<usize> =
        (0..samples.len()).filter(|&i| Polarity::of_index(i) == polarity).collect();

    let trusted: Vec<usize> = if indices.len() > 2 * BORDER_WIDTH {
        indices[BORDER_WIDTH..indices.len() - BORDER_WIDTH].to_vec()
    } else {
        Vec::new()
    };

    let mut set = CategorySet::default();
    let mut floor: u32 = 0;
    let mut w2: u32 = INITIAL_W2;
    let mut bin_width: u32 = 1 << w2;

    loop {
        let ceil = floor + NB as u32 * bin_width;
        let mut bins = [0u8; NB];
        let mut hits: Vec<Vec<usize>> = vec![Vec::new(); NB];
        let mut next_floor: Option<u32> = None;

        for &idx in &trusted {
            if !is_reliable_with_neighbours(samples, idx) {
                continue;
            }
            let v = u32::from(samples[idx].value());
            if v < floor {
                continue;
            }
            if v >= ceil {
                next_floor = Some(next_floor.map_or(v, |nf| nf.min(v)));
                continue;
            }
            let bin = ((v - floor) >> w2) as usize;
            if bin >= NB {
                return Err(CategorizeError::BinIndexOutOfRange);
            }
            bins[bin] = bins[bin].saturating_add(1);
            if hits[bin].len() < FIRST_HITS {
                hits[bin].push(idx);
            }
        }

        let mut requeue_floor: Option<u32> = None;
        let mut bin_i = 0;
        while bin_i < NB {
            if bins[bin_i] == 0 {
                bin_i += 1;
                continue;
            }
            let start = bin_i;
            let (mut stop, reached_top, absorbed_gaps) = extend_run(&bins, start);
            set.inlier_count += absorbed_gaps;

            let mut overlap_here = false;
            if stop - start + 1 >= OVERLAP_MIN_RUN_LEN {
                if let Some(dip) = detect_overlap(&bins, start, stop) {
                    overlap_here = true;
                    stop = dip;
                    set.overlap = true;
                }
            }

            if reached_top && !overlap_here {
                let rq = floor + start as u32 * bin_width;
                requeue_floor = Some(requeue_floor.map_or(rq, |v| v.min(rq)));
                clear_run(&mut bins, &mut hits, start, NB - 1);
                break;
            }

            let run_len = stop - start + 1;
            if run_len >= MIN_SIZE {
                set.push_cluster(materialize_cluster(&bins, start, stop, floor, bin_width))?;
            }
            sieve_outliers(&bins, &hits, start, stop, &mut set)?;
            clear_run(&mut bins, &mut hits, start, stop);
            bin_i = stop + 1;
        }

        debug!(
            ?polarity,
            clusters = set.clusters.len(),
            outliers = set.outliers.len(),
            "histogram pass complete"
        );

        let candidate = requeue_floor.or(next_floor);
        match candidate {
            None => break,
            Some(nf) if nf >= u32::from(CEIL) => break,
            Some(nf) => {
                let mut new_floor = nf.saturating_sub(bin_width);
                while new_floor >= floor + NB as u32 * bin_width {
                    w2 += 1;
                    bin_width = 1 << w2;
                }
                floor = new_floor;
            }
        }
    }

    if set.clusters.is_empty() {
        return Err(CategorizeError::NoCluster);
    }
    Ok(set)
}

fn is_reliable_with_neighbours(samples: &[Sample], idx: usize) -> bool {
    if !samples[idx].reliable() {
        return false;
    }
    let prev_ok = idx == 0 || samples[idx - 1].reliable();
    let next_ok = idx + 1 >= samples.len() || samples[idx + 1].reliable();
    prev_ok && next_ok
}

/// Extends a cluster run from `start`, tolerating up to `MAX_HOLES`
/// consecutive empty bins. Returns `(stop, reached_top, absorbed_gaps)`.
fn extend_run(bins: &[u8; NB], start: usize) -> (usize, bool, usize) {
    let mut stop = start;
    let mut holes = 0;
    let mut absorbed = 0;
    let mut j = start + 1;
    loop {
        if j >= NB {
            return (stop, true, absorbed);
        }
        if bins[j] == 0 {
            holes += 1;
            if holes > MAX_HOLES {
                return (stop, false, absorbed);
            }
            absorbed += 1;
        } else {
            stop = j;
            holes = 0;
        }
        j += 1;
    }
}

/// Tracks a sliding three-bin sum across `[start, stop]`; if the sum
/// descends to a local minimum and then rises back by more than
/// `OVERLAP_RISE_THRESHOLD`, returns the bin index where the run should be
/// truncated.
fn detect_overlap(bins: &[u8; NB], start: usize, stop: usize) -> Option<usize> {
    if stop < start + 2 {
        return None;
    }
    let sums: Vec<u32> = (start..=stop - 2)
        .map(|k| bins[k] as u32 + bins[k + 1] as u32 + bins[k + 2] as u32)
        .collect();

    let mut min_idx = 0;
    let mut descending = true;
    for k in 1..sums.len() {
        if descending {
            if sums[k] <= sums[min_idx] {
                min_idx = k;
            } else {
                descending = false;
                if sums[k] > sums[min_idx] + OVERLAP_RISE_THRESHOLD {
                    return Some(start + min_idx + 1);
                }
            }
        }
    }
    None
}

fn materialize_cluster(bins: &[u8; NB], start: usize, stop: usize, floor: u32, bin_width: u32) -> Cluster {
    let count: u32 = (start..=stop).map(|k| bins[k] as u32).sum();
    let weighted: u32 = (start..=stop).map(|k| (k - start) as u32 * bins[k] as u32).sum();
    let mean_of_bins = if count > 0 { weighted as f64 / count as f64 } else { 0.0 };

    let cluster_floor = floor + start as u32 * bin_width;
    let cluster_ceil = floor + (stop as u32 + 1) * bin_width;
    let center_f =
        (start as f64 + mean_of_bins) * bin_width as f64 + floor as f64 - bin_width as f64 / 2.0;
    let center = (center_f.max(0.0).round() as u32 as u16) & !1;

    Cluster {
        floor: cluster_floor.min(u32::from(u16::MAX)) as u16,
        ceil: cluster_ceil.min(u32::from(u16::MAX)) as u16,
        center,
        size: count as usize,
    }
}

fn sieve_outliers(
    bins: &[u8; NB],
    hits: &[Vec<usize>],
    start: usize,
    stop: usize,
    set: &mut CategorySet,
) -> Result<(), CategorizeError> {
    for k in start..=stop {
        if bins[k] != 0 {
            for &h in &hits[k] {
                trace!(bin = k, index = h, "outlier sieved from leftover bin");
                set.push_outlier(h)?;
            }
        }
    }
    Ok(())
}

fn clear_run(bins: &mut [u8; NB], hits: &mut [Vec<usize>], start: usize, stop: usize) {
    for k in start..=stop {
        bins[k] = 0;
        hits[k].clear();
    }
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
    fn finds_single_cluster_for_uniform_high_durations() {
        let high = vec![400u16; 40];
        let low = vec![1200u16; 40];
        let samples = build_trace(&high, &low);
        let set = cluster(&samples, Polarity::High).unwrap();
        assert_eq!(set.clusters.len(), 1);
    }

    #[test]
    fn errors_with_no_cluster_on_empty_trusted_range() {
        let samples = vec![Sample::new(1, true); 4];
        let result = cluster(&samples, Polarity::High);
        assert_eq!(result.unwrap_err(), CategorizeError::NoCluster);
    }

    #[test]
    fn finds_multiple_well_separated_clusters() {
        let mut high = Vec::new();
        for _ in 0..20 {
            high.push(400u16);
        }
        for _ in 0..20 {
            high.push(1600u16);
        }
        let low = vec![1200u16; 40];
        let samples = build_trace(&high, &low);
        let set = cluster(&samples, Polarity::High).unwrap();
        assert!(set.clusters.len() >= 2);
    }
}
