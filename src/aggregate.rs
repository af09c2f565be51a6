//! Grouped aggregation of typed records.
//!
//! Records are partitioned by a tuple of key columns and reduced with
//! the arithmetic mean. Output order is deterministic: groups sort by
//! ascending key tuple, numbers before text, so repeated runs over the
//! same input always produce the same report.
//!
//! Missing values contribute nothing to a mean. A record whose value is
//! [`Value::Missing`] still belongs to its group conceptually, but only
//! records carrying a number move the average; a group with no numeric
//! contributions at all is omitted from [`group_mean`] output. Asking
//! for a column the table never had yields an empty result, which
//! callers treat as "skip this series", not as an error.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::histogram::{bucketize, parse_hist, BucketedHistogram};
use crate::table::TypedRecord;
use crate::value::Value;

/// One component of a grouping key.
#[derive(Debug, Clone, Serialize)]
pub enum KeyValue {
    Number(f64),
    Text(String),
}

impl KeyValue {
    /// The numeric component, if this key part is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValue {}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyValue {
    /// Numeric ascending first, then lexicographic for text components.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// The tuple of key-column values identifying one group.
pub type GroupKey = Vec<KeyValue>;

/// A group key paired with the mean of the requested value column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedGroup {
    pub key: GroupKey,
    pub mean: f64,
}

/// Mean of one stage column within a group, with its share of the
/// group's stage total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageShare {
    pub column: String,
    pub mean: f64,
    pub percent: f64,
}

/// Per-group stage means normalized to percent-of-total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageBreakdown {
    pub key: GroupKey,
    pub stages: Vec<StageShare>,
}

/// Per-group averaged histogram-bucket percentages, in bucket display
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShares {
    pub key: GroupKey,
    pub percents: [f64; 6],
}

/// Extract a record's grouping key, or `None` when any key column is
/// missing (such records are skipped; they cannot be placed in a group).
fn group_key(record: &TypedRecord, group_columns: &[&str]) -> Option<GroupKey> {
    let mut key = Vec::with_capacity(group_columns.len());
    for &column in group_columns {
        if let Some(value) = record.value(column) {
            match value {
                Value::Number(n) => key.push(KeyValue::Number(n)),
                Value::Missing => return None,
            }
        } else if let Some(text) = record.text(column) {
            key.push(KeyValue::Text(text.to_string()));
        } else {
            return None;
        }
    }
    Some(key)
}

/// Mean of `value_column` per distinct grouping-key tuple.
///
/// Deterministic given its inputs, and performs no filtering beyond the
/// unavoidable: records without a complete key, and values that are
/// [`Value::Missing`], contribute nothing. Output is sorted by ascending
/// key tuple.
#[must_use]
pub fn group_mean(
    records: &[TypedRecord],
    group_columns: &[&str],
    value_column: &str,
) -> Vec<AggregatedGroup> {
    let mut groups: BTreeMap<GroupKey, (f64, u64)> = BTreeMap::new();
    for record in records {
        let Some(key) = group_key(record, group_columns) else {
            continue;
        };
        let Some(value) = record.number(value_column) else {
            continue;
        };
        let slot = groups.entry(key).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (sum, count))| AggregatedGroup {
            key,
            mean: sum / count as f64,
        })
        .collect()
}

/// Per-group means of several stage columns, normalized to percentages
/// of the group's stage total.
///
/// A stage column with no numeric contribution in a group has mean zero.
/// Groups whose stage total is zero report 0% for every stage rather
/// than dividing by zero. Output is sorted by ascending key tuple.
#[must_use]
pub fn stage_shares(
    records: &[TypedRecord],
    group_columns: &[&str],
    stage_columns: &[&str],
) -> Vec<StageBreakdown> {
    let mut groups: BTreeMap<GroupKey, Vec<(f64, u64)>> = BTreeMap::new();
    for record in records {
        let Some(key) = group_key(record, group_columns) else {
            continue;
        };
        let sums = groups
            .entry(key)
            .or_insert_with(|| vec![(0.0, 0); stage_columns.len()]);
        for (slot, &column) in sums.iter_mut().zip(stage_columns) {
            if let Some(value) = record.number(column) {
                slot.0 += value;
                slot.1 += 1;
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, sums)| {
            let means: Vec<f64> = sums
                .iter()
                .map(|&(sum, count)| if count > 0 { sum / count as f64 } else { 0.0 })
                .collect();
            let total: f64 = means.iter().sum();
            let stages = stage_columns
                .iter()
                .zip(&means)
                .map(|(&column, &mean)| StageShare {
                    column: column.to_string(),
                    mean,
                    percent: if total > 0.0 { 100.0 * mean / total } else { 0.0 },
                })
                .collect();
            StageBreakdown { key, stages }
        })
        .collect()
}

/// Per-group averaged bucket percentages for a histogram column.
///
/// Each row's histogram cell is parsed, bucketized, and normalized to
/// percent-of-row-total (all zeros for a zero-total row); the per-row
/// percentages are then averaged within each group. Output is sorted by
/// ascending key tuple.
#[must_use]
pub fn bucket_shares(
    records: &[TypedRecord],
    group_columns: &[&str],
    histogram_column: &str,
) -> Vec<BucketShares> {
    let mut groups: BTreeMap<GroupKey, ([f64; 6], u64)> = BTreeMap::new();
    for record in records {
        let Some(key) = group_key(record, group_columns) else {
            continue;
        };
        let Some(raw) = record.text(histogram_column) else {
            continue;
        };
        let percents = bucketize(&parse_hist(raw)).percentages();
        let slot = groups.entry(key).or_insert(([0.0; 6], 0));
        for (sum, pct) in slot.0.iter_mut().zip(percents.iter()) {
            *sum += pct;
        }
        slot.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (sums, count))| {
            let mut percents = sums;
            for slot in &mut percents {
                *slot /= count as f64;
            }
            BucketShares { key, percents }
        })
        .collect()
}

/// Sum the bucketized histograms of every record into one distribution.
///
/// Records without the histogram column, and cells where no token
/// parses, contribute nothing.
#[must_use]
pub fn total_histogram(records: &[TypedRecord], histogram_column: &str) -> BucketedHistogram {
    let mut out = BucketedHistogram::default();
    for record in records {
        if let Some(raw) = record.text(histogram_column) {
            out.merge(&bucketize(&parse_hist(raw)));
        }
    }
    out
}
