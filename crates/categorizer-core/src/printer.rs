//! Sequence printer: renders a categorized trace as two aligned character
//! rows plus a category table.
//!
//! One character per value, `0`..`9` then `a`..`h` for category indices, with
//! `*` for top-outliers (above the separator barrier), `-` for a value
//! below the lowest cluster's center that still isn't classifiable, `?`
//! for anything else that isn't classifiable, and a blank for the
//! synthetic zero-fill left behind by a resorbed window.

use std::fmt::Write as _;

use crate::classifier::classify;
use crate::config::ClassifyOption;
use crate::types::{CategorySet, Classification, Polarity, Sample};

const CATEGORY_GLYPHS: &[u8] = b"0123456789abcdefgh";

/// Renders the HIGH row, the LOW row, and a category table for the given
/// samples and classification.
pub fn render(samples: &[Sample], classification: &Classification) -> String {
    let mut high_row = String::new();
    let mut low_row = String::new();

    for (i, &sample) in samples.iter().enumerate() {
        let polarity = Polarity::of_index(i);
        let set = classification.for_polarity(polarity);
        let row = match polarity {
            Polarity::High => &mut high_row,
            Polarity::Low => &mut low_row,
        };

        if sample.value() == 0 {
            row.push(' ');
            continue;
        }
        if let Some(barrier) = set.separator_barrier {
            if sample.value() >= barrier {
                row.push('*');
                continue;
            }
        }
        match classify(set, sample.value(), ClassifyOption::Medium) {
            Some(result) if result.near && result.index < CATEGORY_GLYPHS.len() => {
                row.push(CATEGORY_GLYPHS[result.index] as char);
            }
            _ => {
                let below_lowest =
                    set.clusters.first().is_some_and(|c| sample.value() < c.center);
                row.push(if below_lowest { '-' } else { '?' });
            }
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{high_row}");
    let _ = writeln!(output, "{low_row}");
    let _ = writeln!(output, "{}", render_category_table(&classification.high));
    let _ = writeln!(output, "{}", render_category_table(&classification.low));
    output
}

fn render_category_table(set: &CategorySet) -> String {
    let mut table = String::new();
    for (i, cluster) in set.clusters.iter().enumerate() {
        if i > 0 {
            table.push(',');
        }
        let _ = write!(table, "{i}:{}", cluster.center);
    }
    table.push(';');
    for (i, aggregation) in set.aggregations.iter().enumerate() {
        if i > 0 {
            table.push(',');
        }
        let _ = write!(table, "{}:{}", set.clusters.len() + i, aggregation.center);
    }
    table
}
