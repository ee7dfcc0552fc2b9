//! Nearest-category classifier.
//!
//! Ported from the categorizer's binary-style cluster scan: finds the
//! cluster or aggregation nearest a query value and reports whether the
//! match is tight enough to count as "near" under a given
//! [`ClassifyOption`] tolerance.

use crate::config::ClassifyOption;
use crate::types::CategorySet;

/// The result of classifying a single value against a [`CategorySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    /// Index of the matched category: `0..cluster_size` for a cluster,
    /// `cluster_size..` for an aggregation.
    pub index: usize,
    /// The matched category's center value.
    pub center: u16,
    /// Whether the match is within tolerance for the given option.
    pub near: bool,
}

/// Classifies `v` against `set`'s clusters and aggregations, returning the
/// nearest category whether or not it is within tolerance.
///
/// Returns `None` only if `set` has no clusters at all — an empty category
/// set cannot classify anything.
pub fn classify(set: &CategorySet, v: u16, option: ClassifyOption) -> Option<Classified> {
    let clusters = &set.clusters;
    if clusters.is_empty() {
        return None;
    }

    // Step 1: first cluster whose ceil strictly exceeds v (ascending ceil).
    let slot = clusters.iter().position(|c| c.ceil > v);

    let (mut index, mut center) = match slot {
        Some(i) if v >= clusters[i].floor => {
            // Step 2: encloses v exactly; this is as near as it gets.
            return Some(Classified { index: i, center: clusters[i].center, near: true });
        }
        Some(i) => {
            // Step 3: pick the nearer of this slot and the one below.
            if i == 0 {
                (i, clusters[i].center)
            } else {
                let above_delta = clusters[i].center.abs_diff(v);
                let below_delta = clusters[i - 1].center.abs_diff(v);
                if below_delta <= above_delta {
                    (i - 1, clusters[i - 1].center)
                } else {
                    (i, clusters[i].center)
                }
            }
        }
        None => {
            // v exceeds all clusters; the highest is the candidate.
            let last = clusters.len() - 1;
            (last, clusters[last].center)
        }
    };
    let mut delta = center.abs_diff(v);

    // Step 4: scan aggregations linearly for a closer match.
    for (a, aggregation) in set.aggregations.iter().enumerate() {
        let aggregation_delta = aggregation.center.abs_diff(v);
        if aggregation_delta < delta {
            delta = aggregation_delta;
            center = aggregation.center;
            index = clusters.len() + a;
        }
    }

    let near = delta < (u32::from(center) >> option.shift()) as u16;
    Some(Classified { index, center, near })
}
