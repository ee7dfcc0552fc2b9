//! Outlier aggregator: groups nearby outlier values into mini-clusters.
//!
//! Ported from the categorizer's aggregation pass: sorts outlier indices by
//! the value they point at, then greedily groups adjacent values while the
//! gap between them stays within about 12.5% of the upper value.

use crate::config::MAX_AGGREGATIONS;
use crate::error::CategorizeError;
use crate::helpers::insertion_sort_by_key_index;
use crate::types::Aggregation;

/// Groups outlier indices into aggregations.
///
/// `outliers` is the polarity's outlier-index list (unsorted on entry;
/// sorted by value in place as a side effect, matching the original
/// in-place sort). `value_of` resolves an index to its decoded duration.
/// `min_size` is the minimum group size (exclusive: a group needs *more
/// than* `min_size` members) required to materialize — callers pass
/// `MIN_SIZE` for the post-clustering pass and `0` for corrector passes.
pub fn aggregate(
    outliers: &mut [usize],
    value_of: impl Fn(usize) -> u16,
    min_size: usize,
) -> Result<Vec<Aggregation>, CategorizeError> {
    insertion_sort_by_key_index(outliers, &value_of);

    let mut aggregations = Vec::new();
    let mut group_start = 0;

    while group_start < outliers.len() {
        let mut group_end = group_start + 1;
        while group_end < outliers.len() {
            let below = value_of(outliers[group_end - 1]);
            let above = value_of(outliers[group_end]);
            if u32::from(below) + (u32::from(above) >> 3) > u32::from(above) {
                group_end += 1;
            } else {
                break;
            }
        }

        let group_size = group_end - group_start;
        if group_size > min_size {
            let group = &outliers[group_start..group_end];
            let floor = value_of(group[0]);
            let ceil = value_of(group[group_size - 1]) + 1;
            let sum: u32 = group.iter().map(|&i| u32::from(value_of(i))).sum();
            let center = ((sum / group_size as u32) as u16) & !1;

            if aggregations.len() >= MAX_AGGREGATIONS {
                return Err(CategorizeError::TooManyAggregations);
            }
            aggregations.push(Aggregation { floor, ceil, center, size: group_size });
        }

        group_start = group_end;
    }

    Ok(aggregations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_adjacent_close_values() {
        let values = [100u16, 105, 110, 900];
        let mut outliers = vec![0usize, 1, 2, 3];
        let result = aggregate(&mut outliers, |i| values[i], 0).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].size, 3);
    }

    #[test]
    fn rejects_groups_not_exceeding_min_size() {
        let values = [100u16, 105];
        let mut outliers = vec![0usize, 1];
        let result = aggregate(&mut outliers, |i| values[i], 3).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn separates_far_apart_values() {
        let values = [100u16, 900];
        let mut outliers = vec![0usize, 1];
        let result = aggregate(&mut outliers, |i| values[i], 0).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn is_idempotent_given_the_same_input_and_m_zero() {
        let values = [50u16, 52, 54, 500, 505];
        let mut a = vec![0usize, 1, 2, 3, 4];
        let mut b = vec![4usize, 2, 0, 3, 1];
        let first = aggregate(&mut a, |i| values[i], 0).unwrap();
        let second = aggregate(&mut b, |i| values[i], 0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn center_has_lsb_masked() {
        let values = [101u16, 103];
        let mut outliers = vec![0usize, 1];
        let result = aggregate(&mut outliers, |i| values[i], 0).unwrap();
        assert_eq!(result[0].center % 2, 0);
    }
}
