//! Synthesizes a flagged duration trace and prints the categorized rows.
//!
//! This is a demo harness over synthetic data, not a radio front-end or
//! recorder implementation — it exists to exercise `categorize()` and
//! `render()` end to end without needing real capture hardware.

use categorizer::{categorize, render, Sample};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut samples = Vec::new();
    for _ in 0..30 {
        samples.push(Sample::new(400, true));
        samples.push(Sample::new(1200, true));
    }
    // A single stray HIGH duration that should end up an outlier.
    samples[6] = Sample::new(50, true);

    let classification = categorize(&mut samples, 0)?;
    print!("{}", render(&samples, &classification));
    Ok(())
}
