use proptest::prelude::*;

use crate::aggregate::{group_mean, stage_shares};
use crate::histogram::{bucketize, parse_hist};
use crate::rows::{reconstruct, tokenize, LeadingIntId};
use crate::table::TypedRecord;
use crate::value::{coerce, Value};
use crate::windows::{merge_overall, RunTag, WindowSample};

prop_compose! {
    /// A well-formed histogram cell with unique keys: some exact, some
    /// overflow sentinels.
    fn arb_hist()(
        entries in prop::collection::btree_map(0u64..200, 0u32..100_000, 0..20),
        overflow in prop::collection::btree_map(0u64..200, 0u32..100_000, 0..4),
    ) -> (String, f64) {
        let mut tokens = Vec::new();
        let mut total = 0.0;
        for (k, v) in &entries {
            tokens.push(format!("{k}:{v}"));
            total += f64::from(*v);
        }
        for (k, v) in &overflow {
            tokens.push(format!("{k}+:{v}"));
            total += f64::from(*v);
        }
        (tokens.join(", "), total)
    }
}

prop_compose! {
    /// A per-core cell built from one integer list per core line.
    fn arb_per_core_cell()(
        lines in prop::collection::vec(prop::collection::vec(-10_000i32..10_000, 1..8), 1..5),
    ) -> (String, Vec<f64>) {
        let flat: Vec<f64> = lines.iter().flatten().map(|&v| f64::from(v)).collect();
        let cell = lines
            .iter()
            .map(|line| line.iter().map(i32::to_string).collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("\\n");
        (cell, flat)
    }
}

prop_compose! {
    /// A well-formed table: every logical row on one physical line, the
    /// first column an integer row ID.
    fn arb_flat_table()(
        width in 1usize..6,
        ids in prop::collection::vec(0u32..1000, 0..30),
    )(
        cells in prop::collection::vec(
            prop::collection::vec("[a-z0-9.]{0,8}", width),
            ids.len()..=ids.len(),
        ),
        ids in Just(ids),
        width in Just(width),
    ) -> String {
        let mut text = String::from("ID");
        for i in 0..width {
            text.push_str(&format!(",col{i}"));
        }
        text.push('\n');
        for (id, row) in ids.iter().zip(cells.iter()) {
            text.push_str(&id.to_string());
            for cell in row {
                text.push(',');
                text.push_str(cell);
            }
            text.push('\n');
        }
        text
    }
}

proptest! {
    /// Coercion never panics, whatever the cell holds.
    #[test]
    fn prop_coerce_total(cell in ".*") {
        let _ = coerce(&cell);
    }

    /// Conservation: the bucketed total equals the parsed total equals
    /// the sum of the generated counts.
    #[test]
    fn prop_hist_conservation((text, expected_total) in arb_hist()) {
        let entry = parse_hist(&text);
        let bucketed = bucketize(&entry);
        prop_assert!((entry.total() - expected_total).abs() < 1e-6);
        prop_assert!((bucketed.total() - expected_total).abs() < 1e-6);
    }

    /// Histogram parsing never panics on arbitrary input, and bucketing
    /// still conserves whatever was parsed.
    #[test]
    fn prop_hist_total_on_garbage(text in ".*") {
        let entry = parse_hist(&text);
        let bucketed = bucketize(&entry);
        let tolerance = 1e-9 * entry.total().abs().max(1.0);
        prop_assert!((bucketed.total() - entry.total()).abs() <= tolerance
            || bucketed.total().is_infinite()
            || bucketed.total().is_nan());
    }

    /// Bucket percentages stay within [0, 100] and sum to 100 (or all
    /// zero for an empty histogram).
    #[test]
    fn prop_bucket_percentages_bounds((text, _total) in arb_hist()) {
        let percents = bucketize(&parse_hist(&text)).percentages();
        let sum: f64 = percents.iter().sum();
        for p in percents {
            prop_assert!((0.0..=100.0 + 1e-9).contains(&p));
        }
        prop_assert!(sum.abs() < 1e-6 || (sum - 100.0).abs() < 1e-6);
    }

    /// The per-core aggregate equals the mean of the flattened list,
    /// exactly as computed from the same values.
    #[test]
    fn prop_per_core_mean_matches_flat_list((cell, flat) in arb_per_core_cell()) {
        prop_assert_eq!(crate::per_core_values(&cell), flat.clone());
        let expected = flat.iter().sum::<f64>() / flat.len() as f64;
        match crate::per_core_mean(&cell) {
            Value::Number(mean) => prop_assert!((mean - expected).abs() < 1e-9),
            Value::Missing => prop_assert!(false, "non-empty cell decoded as missing"),
        }
    }

    /// Per-core decoding never panics on arbitrary input.
    #[test]
    fn prop_per_core_total(cell in ".*") {
        let _ = crate::per_core_mean(&cell);
    }

    /// Reconstruction is the identity on well-formed input: every
    /// logical row already on one physical line parses to the same
    /// cells a direct line-by-line parse produces.
    #[test]
    fn prop_reconstruct_idempotent(text in arb_flat_table()) {
        let raw = reconstruct(&text, &LeadingIntId).unwrap();
        let direct: Vec<Vec<String>> = text.lines().skip(1).map(tokenize).collect();
        prop_assert_eq!(raw.rows, direct);
    }

    /// Reconstructed rows always match the header width, whatever the
    /// input lines look like.
    #[test]
    fn prop_reconstruct_row_width(text in "[a-zA-Z0-9,.\n\"]*") {
        if let Some(raw) = reconstruct(&text, &LeadingIntId) {
            let width = raw.header.len();
            prop_assert!(width > 0);
            for row in &raw.rows {
                prop_assert_eq!(row.len(), width);
            }
        }
    }

    /// A group holding a single record reports that record's value.
    #[test]
    fn prop_group_of_one_is_identity(key in 0u32..100, value in -1e9f64..1e9) {
        let mut record = TypedRecord::default();
        record.set_value("k", Value::Number(f64::from(key)));
        record.set_value("v", Value::Number(value));
        let groups = group_mean(&[record], &["k"], "v");
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].mean, value);
    }

    /// Group means fall within the min/max of contributed values, and
    /// groups come back sorted by key.
    #[test]
    fn prop_group_mean_bounds(
        rows in prop::collection::vec((0u32..5, -1000i32..1000), 1..50),
    ) {
        let records: Vec<TypedRecord> = rows
            .iter()
            .map(|&(k, v)| {
                let mut record = TypedRecord::default();
                record.set_value("k", Value::Number(f64::from(k)));
                record.set_value("v", Value::Number(f64::from(v)));
                record
            })
            .collect();
        let groups = group_mean(&records, &["k"], "v");

        for pair in groups.windows(2) {
            prop_assert!(pair[0].key < pair[1].key, "groups not sorted");
        }
        for group in &groups {
            let members: Vec<f64> = rows
                .iter()
                .filter(|&&(k, _)| {
                    group.key[0].as_number() == Some(f64::from(k))
                })
                .map(|&(_, v)| f64::from(v))
                .collect();
            let min = members.iter().copied().fold(f64::INFINITY, f64::min);
            let max = members.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(group.mean >= min - 1e-9 && group.mean <= max + 1e-9);
        }
    }

    /// Stage percentages per group sum to 100, or to 0 when the group's
    /// stage total is zero.
    #[test]
    fn prop_stage_shares_sum(
        rows in prop::collection::vec((0u32..3, 0u32..100, 0u32..100), 1..30),
    ) {
        let records: Vec<TypedRecord> = rows
            .iter()
            .map(|&(k, a, b)| {
                let mut record = TypedRecord::default();
                record.set_value("k", Value::Number(f64::from(k)));
                record.set_value("a", Value::Number(f64::from(a)));
                record.set_value("b", Value::Number(f64::from(b)));
                record
            })
            .collect();
        for group in stage_shares(&records, &["k"], &["a", "b"]) {
            let sum: f64 = group.stages.iter().map(|s| s.percent).sum();
            prop_assert!(sum.abs() < 1e-6 || (sum - 100.0).abs() < 1e-6);
        }
    }

    /// Overall window distributions always total 100% when any count is
    /// positive, with midpoints strictly ascending.
    #[test]
    fn prop_merge_overall_total(
        windows in prop::collection::vec((0u32..50, 1u32..1000), 1..40),
    ) {
        let samples: Vec<WindowSample> = windows
            .iter()
            .map(|&(bucket, count)| WindowSample {
                tag: RunTag { io_size: 4096, queue_depth: 1, run: 0 },
                start: f64::from(bucket) * 10.0,
                end: f64::from(bucket) * 10.0 + 10.0,
                count: f64::from(count),
            })
            .collect();
        let dist = merge_overall(&samples);
        let total: f64 = dist.iter().map(|p| p.percent).sum();
        prop_assert!((total - 100.0).abs() < 1e-6);
        for pair in dist.windows(2) {
            prop_assert!(pair[0].midpoint < pair[1].midpoint);
        }
    }
}
