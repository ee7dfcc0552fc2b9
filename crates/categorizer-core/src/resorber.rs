//! Spike/drop elimination on a 5-element untrusted window.
//!
//! Ported from the categorizer's resorber: folds a window's border
//! mismatch into a synthesized "virtual triple" and checks whether
//! collapsing the triple to a single category center is a better fit than
//! whatever best-fit overwrite the caller already has in hand.

use crate::classifier::classify;
use crate::config::{ClassifyOption, CEIL, RESORBER_LOOSE_THRESHOLD_PERMILLE};
use crate::error::CategorizeError;
use crate::types::CategorySet;

/// The outcome of attempting to resorb a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resorption {
    /// Category index of the matched triple center.
    pub index: usize,
    /// The triple's matched category center, to write into the window's
    /// middle slot.
    pub center: u16,
    /// Relative residual, in parts-per-thousand.
    pub rel_delta: u32,
}

/// Attempts to resorb the window `(a, b, c, d, e)` given the nearest-category
/// values `(cat_a, cat_e)` already classified for the border elements.
///
/// `rel_delta_bestfit` is the caller's current best-fit residual; resorption
/// is only accepted if it strictly improves on this value. Returns `Ok(None)`
/// if resorption is refused (not an error, just not an improvement, or not
/// classifiable at all).
pub fn resorb(
    set: &CategorySet,
    window: (u16, u16, u16, u16, u16),
    borders: (u16, u16),
    rel_delta_bestfit: u32,
) -> Result<Option<Resorption>, CategorizeError> {
    let (a, b, c, d, e) = window;
    let (cat_a, cat_e) = borders;

    let t = u32::from(a.abs_diff(cat_a))
        + u32::from(b)
        + u32::from(c)
        + u32::from(d)
        + u32::from(e.abs_diff(cat_e));

    if t > u32::from(CEIL) {
        return Err(CategorizeError::ResorberTripleSumError);
    }
    let t = t as u16;

    let option = if rel_delta_bestfit > RESORBER_LOOSE_THRESHOLD_PERMILLE {
        ClassifyOption::Medium
    } else {
        ClassifyOption::Tight
    };

    let Some(classified) = classify(set, t, option) else {
        return Ok(None);
    };
    if !classified.near {
        return Ok(None);
    }

    let sum_v = u32::from(a) + u32::from(b) + u32::from(c) + u32::from(d) + u32::from(e);
    let fitted = u32::from(cat_a) + u32::from(classified.center) + u32::from(cat_e);
    let rel_delta = if sum_v == 0 {
        0
    } else {
        1000 * sum_v.abs_diff(fitted) / sum_v
    };

    if rel_delta < rel_delta_bestfit {
        Ok(Some(Resorption { index: classified.index, center: classified.center, rel_delta }))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cluster;

    fn set_with_clusters() -> CategorySet {
        let mut set = CategorySet::default();
        set.push_cluster(Cluster { floor: 350, ceil: 450, center: 400, size: 10 }).unwrap();
        set.push_cluster(Cluster { floor: 900, ceil: 1000, center: 950, size: 10 }).unwrap();
        set
    }

    #[test]
    fn accepts_spike_that_sums_into_known_cluster() {
        let set = set_with_clusters();
        // a and e both match their classified borders exactly, so the
        // virtual triple is just b+c+d; chosen to land exactly on the
        // 950-center cluster, which is an automatic enclosure match.
        let result = resorb(&set, (400, 300, 350, 300, 950), (400, 950), 1000).unwrap();
        let resorption = result.expect("expected an accepted resorption");
        assert_eq!(resorption.center, 950);
    }

    #[test]
    fn refuses_when_not_classifiable() {
        let set = CategorySet::default();
        let result = resorb(&set, (1, 1, 1, 1, 1), (1, 1), 1000).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn errors_when_triple_sum_exceeds_ceiling() {
        let set = set_with_clusters();
        let result = resorb(&set, (0, 40_000, 40_000, 0, 0), (0, 0), 1000);
        assert_eq!(result, Err(CategorizeError::ResorberTripleSumError));
    }
}
