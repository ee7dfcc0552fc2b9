#![doc = include_str!("../README.md")]

pub use categorizer_core::config;
pub use categorizer_core::{
    categorize, classify, cluster, render, Aggregation, CategorySet, CategorizeError,
    Classification, Classified, Cluster, Polarity, Sample,
};

// Expose internal pipeline stages for scenario and property tests that want
// to exercise one stage in isolation.
#[doc(hidden)]
pub mod internals {
    pub use categorizer_core::internals::*;
}
