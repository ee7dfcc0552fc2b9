//! Tunables for the categorizer pipeline.
//!
//! Fixed-capacity constants (`NB`, `NH`, `MAX_HOLES`, `MIN_SIZE`,
//! `FIRST_HITS`, `BORDER_WIDTH`, the `CEIL` sentinel, and the classifier
//! tightness options) for a bounded-memory implementation. The bounds are
//! protocol-significant: they define the overflow errors exercised by the
//! capacity tests, so they are kept exactly as documented even on a host
//! with plenty of RAM to spare.

/// Number of histogram bins used per clustering pass.
pub const NB: usize = 32;

/// Maximum number of recorded first-hit sample indices per clustering pass.
pub const NH: usize = 64;

/// Number of consecutive empty bins tolerated inside a cluster run before
/// the run is considered terminated.
pub const MAX_HOLES: usize = 1;

/// Minimum number of values a histogram run (or post-cluster aggregation)
/// must enclose to be materialized as a cluster.
pub const MIN_SIZE: usize = 3;

/// Number of first arrivals per bin whose sample index is recorded for
/// later outlier sieving.
pub const FIRST_HITS: usize = 2;

/// Width, in samples, of the leading/trailing zone excluded from the
/// trusted interior during histogram bin-fill.
pub const BORDER_WIDTH: usize = 8;

/// Ceiling sentinel. All real durations are strictly less than this value;
/// `CEIL` itself is used as a "no value" / "end of trace" marker.
pub const CEIL: u16 = 65_000;

/// Initial log2 bin width (`bin_width = 1 << INITIAL_W2` = 16) for the
/// first histogram pass of a clustering run.
pub const INITIAL_W2: u32 = 4;

/// Maximum number of clusters tracked per polarity.
pub const MAX_CLUSTERS: usize = 8;

/// Maximum number of aggregations tracked per polarity (`aggreg_size_2`).
pub const MAX_AGGREGATIONS: usize = 8;

/// Maximum number of outlier indices tracked per polarity.
pub const MAX_OUTLIERS: usize = 16;

/// Maximum size of the merged (HIGH ∪ LOW) outlier-index list the corrector
/// walks in its merged-outlier pass.
pub const MAX_MERGED_OUTLIERS: usize = 2 * MAX_OUTLIERS;

/// Minimum run length, in bins, before a cluster run is checked for the
/// overlap (bimodal) heuristic.
pub const OVERLAP_MIN_RUN_LEN: usize = 6;

/// Threshold, in bin-count units, by which a three-bin sliding sum must
/// re-ascend past its local minimum to raise the cluster-overlap flag.
pub const OVERLAP_RISE_THRESHOLD: u32 = 3;

/// Relative-residual threshold (parts-per-thousand) above which the
/// resorber classifies its virtual triple under the looser
/// [`ClassifyOption::Medium`] option rather than [`ClassifyOption::Tight`].
pub const RESORBER_LOOSE_THRESHOLD_PERMILLE: u32 = 100;

/// Multiplier used while raising the separator barrier: a candidate barrier
/// only absorbs outliers strictly below `10 × barrier`.
pub const SEPARATOR_BARRIER_MULTIPLIER: u32 = 10;

/// Classifier tightness option. The discriminant is the right-shift amount
/// applied to a category's center when deciding whether a delta counts as
/// "near": `near = delta < (center >> option)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyOption {
    /// ~25% tolerance.
    Loose = 2,
    /// ~12.5% tolerance.
    Medium = 3,
    /// ~6.25% tolerance.
    Tight = 4,
}

impl ClassifyOption {
    /// The right-shift amount this option applies.
    #[inline]
    pub fn shift(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_amounts_match_documented_options() {
        assert_eq!(ClassifyOption::Loose.shift(), 2);
        assert_eq!(ClassifyOption::Medium.shift(), 3);
        assert_eq!(ClassifyOption::Tight.shift(), 4);
    }
}
