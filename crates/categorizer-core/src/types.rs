//! Core data types shared across the categorizer pipeline.
//!
//! `Sample` wraps the flagged-duration encoding (a 16-bit duration with the
//! reliability flag folded into the LSB) into a small newtype so the rest of
//! the crate can work with decoded `u16` values
//! and only re-encode at explicit write sites.

use crate::config::{MAX_AGGREGATIONS, MAX_CLUSTERS, MAX_OUTLIERS};
use crate::error::CategorizeError;

/// One flagged duration: a 16-bit value with the reliability flag folded
/// into the least-significant bit (bit clear ⇒ reliable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Sample(u16);

impl Sample {
    /// Builds a sample from a decoded duration value and a reliability flag.
    ///
    /// `value`'s own least-significant bit is discarded; the stored LSB is
    /// always the encoded reliability flag.
    #[inline]
    pub fn new(value: u16, reliable: bool) -> Self {
        let encoded = (value & !1) | u16::from(!reliable);
        Self(encoded)
    }

    /// Wraps an already-encoded raw duration value as read from the buffer.
    #[inline]
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// The raw, still-encoded value (for writing back into a caller buffer).
    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// The decoded duration value, with the reliability flag masked off.
    #[inline]
    pub fn value(self) -> u16 {
        self.0 & !1
    }

    /// Whether this sample is flagged reliable (LSB clear).
    #[inline]
    pub fn reliable(self) -> bool {
        self.0 & 1 == 0
    }
}

/// Which half of a HIGH/LOW pair a duration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    High,
    Low,
}

impl Polarity {
    /// The polarity of the sample at `index`, using the 0-indexed convention
    /// (even index ⇒ HIGH, odd index ⇒ LOW).
    #[inline]
    pub fn of_index(index: usize) -> Self {
        if index % 2 == 0 { Self::High } else { Self::Low }
    }
}

/// A discovered duration-level: a contiguous histogram run materialized into
/// an inclusive `[floor, ceil)` enclosure around a representative `center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    pub floor: u16,
    pub ceil: u16,
    pub center: u16,
    /// Number of samples the histogram pass counted inside this run.
    pub size: usize,
}

impl Cluster {
    /// Whether `v` falls inside this cluster's enclosure.
    #[inline]
    pub fn encloses(&self, v: u16) -> bool {
        v >= self.floor && v < self.ceil
    }
}

/// A mini-cluster formed by the post-clustering aggregator out of outlier
/// values that did not fall inside any [`Cluster`] enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregation {
    pub floor: u16,
    pub ceil: u16,
    pub center: u16,
    pub size: usize,
}

impl Aggregation {
    #[inline]
    pub fn encloses(&self, v: u16) -> bool {
        v >= self.floor && v < self.ceil
    }
}

/// The per-polarity result of clustering: the clusters and aggregations
/// discovered, the indices of samples that remain outliers, and the
/// separator barrier above which a value is considered large by nature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySet {
    pub clusters: Vec<Cluster>,
    pub aggregations: Vec<Aggregation>,
    pub outliers: Vec<usize>,
    /// Set once post-clustering locates a separator barrier; `None` if no
    /// such barrier was found for this polarity.
    pub separator_barrier: Option<u16>,
    /// Raised when the adaptive histogram pass detects two clusters merged
    /// into a single run (see the overlap heuristic in `clusterer`).
    pub overlap: bool,
    /// Count of single-bin gaps tolerated (absorbed) while extending cluster
    /// runs during histogram bin-fill; a diagnostic of run raggedness, not
    /// used in any decision.
    pub inlier_count: usize,
}

impl CategorySet {
    pub fn push_cluster(&mut self, cluster: Cluster) -> Result<(), CategorizeError> {
        if self.clusters.len() >= MAX_CLUSTERS {
            return Err(CategorizeError::TooManyClusters);
        }
        self.clusters.push(cluster);
        Ok(())
    }

    pub fn push_aggregation(&mut self, aggregation: Aggregation) -> Result<(), CategorizeError> {
        if self.aggregations.len() >= MAX_AGGREGATIONS {
            return Err(CategorizeError::TooManyAggregations);
        }
        self.aggregations.push(aggregation);
        Ok(())
    }

    pub fn push_outlier(&mut self, index: usize) -> Result<(), CategorizeError> {
        if self.outliers.len() >= MAX_OUTLIERS {
            return Err(CategorizeError::TooManyOutliers);
        }
        self.outliers.push(index);
        Ok(())
    }

    /// Finds the cluster or aggregation enclosing `v`, clusters first.
    pub fn find_enclosing(&self, v: u16) -> Option<u16> {
        self.clusters
            .iter()
            .find(|c| c.encloses(v))
            .map(|c| c.center)
            .or_else(|| {
                self.aggregations
                    .iter()
                    .find(|a| a.encloses(v))
                    .map(|a| a.center)
            })
    }
}

/// The final categorization result for both polarities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub high: CategorySet,
    pub low: CategorySet,
}

impl Classification {
    #[inline]
    pub fn for_polarity(&self, polarity: Polarity) -> &CategorySet {
        match polarity {
            Polarity::High => &self.high,
            Polarity::Low => &self.low,
        }
    }

    #[inline]
    pub fn for_polarity_mut(&mut self, polarity: Polarity) -> &mut CategorySet {
        match polarity {
            Polarity::High => &mut self.high,
            Polarity::Low => &mut self.low,
        }
    }
}
