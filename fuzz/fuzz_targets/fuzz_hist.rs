#![no_main]

use benchsift::{bucketize, parse_hist, Bucket};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Parsing is total: malformed tokens are skipped, never panic.
    let entry = parse_hist(&text);
    let bucketed = bucketize(&entry);

    // Property 1: conservation - every parsed count lands in exactly one
    // bucket. (Allow for float accumulation order and overflow to inf.)
    let entry_total = entry.total();
    let bucket_total = bucketed.total();
    if entry_total.is_finite() && bucket_total.is_finite() {
        let tolerance = 1e-9 * entry_total.abs().max(1.0);
        assert!(
            (entry_total - bucket_total).abs() <= tolerance,
            "conservation violated: {entry_total} vs {bucket_total}"
        );
    }

    // Property 2: an empty entry bucketizes to all-zero buckets.
    if entry.is_empty() {
        for (_, count) in bucketed.iter() {
            assert_eq!(count, 0.0);
        }
    }

    // Property 3: percentages stay bounded for non-negative histograms.
    if entry.iter().all(|(_, c)| c >= 0.0) && bucket_total.is_finite() {
        for p in bucketed.percentages() {
            assert!((0.0..=100.0 + 1e-9).contains(&p), "percent out of range: {p}");
        }
    }

    // Exercise the label path too.
    for bucket in Bucket::ORDER {
        assert!(!bucket.label().is_empty());
    }
});
