#![no_main]

use arbitrary::Arbitrary;
use categorizer::{categorize, Sample};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    durations: Vec<(u16, bool)>,
}

fuzz_target!(|input: Input| {
    if input.durations.len() < 2 || input.durations.len() > 1024 {
        return;
    }

    let mut samples: Vec<Sample> = input
        .durations
        .iter()
        .map(|&(v, reliable)| Sample::new(v, reliable))
        .collect();
    let unreliable_count = samples.iter().filter(|s| !s.reliable()).count();

    // categorize() must never panic, regardless of the input shape; it may
    // only ever return a documented error.
    let _ = categorize(&mut samples, unreliable_count);
});
