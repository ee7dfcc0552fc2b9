//! Flat return-code error scheme, ported to a `Result`-based API.
//!
//! The teacher workspace does not carry a `thiserror` dependency; errors
//! here follow the same hand-rolled pattern as the rest of the pack, with a
//! manual `Display` and `std::error::Error` impl and a `.code()` accessor
//! returning the numeric code from the documented return-code ranges
//! (2 = subsequence length, 3-8 = unclusterable, 10-18 = internal
//! invariant violations).

use std::fmt;

/// Errors raised while categorizing a flagged duration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorizeError {
    /// An extractor window had a length other than 4 or 5.
    SubsequenceLengthError,
    /// More clusters were discovered for a polarity than `MAX_CLUSTERS`.
    TooManyClusters,
    /// More aggregations were formed for a polarity than `MAX_AGGREGATIONS`.
    TooManyAggregations,
    /// More outliers were recorded for a polarity than `MAX_OUTLIERS`.
    TooManyOutliers,
    /// More first-hit records were recorded than `NH` in a single
    /// histogram pass.
    TooManyHits,
    /// No cluster was ever materialized for a polarity.
    NoCluster,
    /// Two clusters merged into a single bimodal run; the corrector is
    /// suppressed for the whole trace.
    OverlappingClusters,
    /// A histogram bin expected to have been zeroed by the materialize
    /// step still held a count at the start of the next pass.
    BinsNotEmpty,
    /// A histogram bin index computed during clustering fell outside
    /// `0..NB`.
    BinIndexOutOfRange,
    /// The resorber's virtual triple sum reached or exceeded `CEIL`.
    ResorberTripleSumError,
    /// The corrector's merged-outlier pass produced a merged index list
    /// larger than `MAX_MERGED_OUTLIERS`.
    TooManyMergedOutliers,
    /// A sample index referenced during correction or printing was out of
    /// bounds for the input sequence.
    IndexOutOfBounds,
}

impl CategorizeError {
    /// The numeric return code this variant corresponds to.
    pub fn code(self) -> i32 {
        match self {
            Self::SubsequenceLengthError => 2,
            Self::TooManyClusters => 3,
            Self::TooManyAggregations => 4,
            Self::TooManyOutliers => 5,
            Self::TooManyHits => 6,
            Self::NoCluster => 7,
            Self::OverlappingClusters => 8,
            Self::BinsNotEmpty => 10,
            Self::BinIndexOutOfRange => 11,
            Self::ResorberTripleSumError => 12,
            Self::TooManyMergedOutliers => 13,
            Self::IndexOutOfBounds => 14,
        }
    }

    /// Whether this error is a fatal internal invariant violation (codes
    /// 10-18), as opposed to an unclusterable-trace condition that the
    /// outer loop simply discards and retries on the next trace.
    pub fn is_internal_invariant(self) -> bool {
        self.code() >= 10
    }
}

impl fmt::Display for CategorizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::SubsequenceLengthError => "extractor window length was not 4 or 5",
            Self::TooManyClusters => "more clusters discovered than the fixed per-polarity capacity",
            Self::TooManyAggregations => "more aggregations formed than the fixed per-polarity capacity",
            Self::TooManyOutliers => "more outliers recorded than the fixed per-polarity capacity",
            Self::TooManyHits => "more first-hit records than the fixed per-pass capacity",
            Self::NoCluster => "no cluster was materialized for a polarity",
            Self::OverlappingClusters => "two clusters merged into one bimodal histogram run",
            Self::BinsNotEmpty => "a histogram bin was not cleared before the next pass",
            Self::BinIndexOutOfRange => "histogram bin index out of range",
            Self::ResorberTripleSumError => "resorber virtual triple sum reached the ceiling sentinel",
            Self::TooManyMergedOutliers => "merged outlier list exceeded its fixed capacity",
            Self::IndexOutOfBounds => "sample index out of bounds",
        };
        write!(f, "{message} (code {})", self.code())
    }
}

impl std::error::Error for CategorizeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_fall_in_documented_ranges() {
        assert_eq!(CategorizeError::SubsequenceLengthError.code(), 2);
        assert!((3..=8).contains(&CategorizeError::TooManyClusters.code()));
        assert!((3..=8).contains(&CategorizeError::OverlappingClusters.code()));
        assert!(CategorizeError::BinsNotEmpty.is_internal_invariant());
        assert!(!CategorizeError::TooManyClusters.is_internal_invariant());
    }

    #[test]
    fn display_includes_code() {
        let message = CategorizeError::TooManyClusters.to_string();
        assert!(message.contains("code 3"));
    }
}
