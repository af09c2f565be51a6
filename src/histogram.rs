//! Compact histogram mini-format parsing and fixed-bucket reduction.
//!
//! Benchmark exports embed per-row histograms as a single cell in the
//! form `"0:123, 1:456, 32+:789"`. Keys are non-negative integers, with
//! a trailing `+` marking an overflow sentinel ("this many or more").
//! The sentinel is a distinct key from the bare integer.
//!
//! Raw entries are reduced to six fixed buckets so that distributions
//! stay visually and statistically comparable across runs with different
//! maximum queue depths:
//!
//! | Key            | Bucket       |
//! |----------------|--------------|
//! | any `N+`       | `17+`        |
//! | 0              | `Empty (0)`  |
//! | 1              | `Single (1)` |
//! | 2..=4          | `2-4`        |
//! | 5..=8          | `5-8`        |
//! | 9..=16         | `9-16`       |
//! | 17 and above   | `17+`        |
//!
//! Malformed tokens are skipped, never fatal. The sum of bucketed counts
//! always equals the sum of successfully parsed entry counts.

use std::collections::HashMap;

use serde::Serialize;

use crate::constants::{is_numeric_shaped, OVERFLOW_SUFFIX};

/// A key in a raw histogram entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BucketKey {
    /// An exact observation count.
    Exact(u64),
    /// Overflow sentinel: this count or more.
    Overflow(u64),
}

/// A parsed histogram cell: bucket key to count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramEntry {
    counts: HashMap<BucketKey, f64>,
}

impl HistogramEntry {
    /// Count for a key, `0.0` if absent.
    #[must_use]
    pub fn get(&self, key: BucketKey) -> f64 {
        self.counts.get(&key).copied().unwrap_or(0.0)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no token parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(key, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (BucketKey, f64)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }
}

/// Parse one histogram mini-format cell.
///
/// Tokens are comma-separated `key:count` pairs. A token whose key is not
/// all digits (with an optional trailing `+`), or whose count does not
/// parse as a number, is skipped. Empty input yields an empty entry.
/// Duplicate keys keep the last occurrence.
#[must_use]
pub fn parse_hist(text: &str) -> HistogramEntry {
    let mut entry = HistogramEntry::default();
    for token in text.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((key_part, count_part)) = token.split_once(':') else {
            continue;
        };
        let Some(key) = parse_key(key_part) else {
            continue;
        };
        let count_part = count_part.trim();
        if !is_numeric_shaped(count_part) {
            continue;
        }
        let Ok(count) = count_part.parse::<f64>() else {
            continue;
        };
        entry.counts.insert(key, count);
    }
    entry
}

/// Parse a histogram key: all digits, optionally suffixed with `+`.
///
/// No surrounding whitespace is tolerated here; the key must butt up
/// against the colon exactly as the exporter writes it.
fn parse_key(key: &str) -> Option<BucketKey> {
    let (digits, overflow) = match key.strip_suffix(OVERFLOW_SUFFIX) {
        Some(rest) => (rest, true),
        None => (key, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n = digits.parse::<u64>().ok()?;
    Some(if overflow {
        BucketKey::Overflow(n)
    } else {
        BucketKey::Exact(n)
    })
}

/// One of the six fixed reduction buckets, ordered from empty to overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    Empty,
    Single,
    TwoToFour,
    FiveToEight,
    NineToSixteen,
    SeventeenPlus,
}

impl Bucket {
    /// All buckets in display order.
    pub const ORDER: [Self; 6] = [
        Self::Empty,
        Self::Single,
        Self::TwoToFour,
        Self::FiveToEight,
        Self::NineToSixteen,
        Self::SeventeenPlus,
    ];

    /// Human-readable label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "Empty (0)",
            Self::Single => "Single (1)",
            Self::TwoToFour => "2-4",
            Self::FiveToEight => "5-8",
            Self::NineToSixteen => "9-16",
            Self::SeventeenPlus => "17+",
        }
    }

    /// Bucket for a raw key. Overflow sentinels always land in `17+`,
    /// regardless of their numeric part.
    #[must_use]
    pub fn for_key(key: BucketKey) -> Self {
        match key {
            BucketKey::Overflow(_) => Self::SeventeenPlus,
            BucketKey::Exact(0) => Self::Empty,
            BucketKey::Exact(1) => Self::Single,
            BucketKey::Exact(2..=4) => Self::TwoToFour,
            BucketKey::Exact(5..=8) => Self::FiveToEight,
            BucketKey::Exact(9..=16) => Self::NineToSixteen,
            BucketKey::Exact(_) => Self::SeventeenPlus,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single => 1,
            Self::TwoToFour => 2,
            Self::FiveToEight => 3,
            Self::NineToSixteen => 4,
            Self::SeventeenPlus => 5,
        }
    }
}

/// A histogram reduced to the six fixed buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BucketedHistogram {
    counts: [f64; 6],
}

impl BucketedHistogram {
    /// Count in one bucket.
    #[must_use]
    pub fn get(&self, bucket: Bucket) -> f64 {
        self.counts[bucket.index()]
    }

    /// Sum over all six buckets.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Iterate `(bucket, count)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, f64)> + '_ {
        Bucket::ORDER.iter().map(move |&b| (b, self.get(b)))
    }

    /// Accumulate another bucketed histogram into this one.
    pub fn merge(&mut self, other: &Self) {
        for (slot, v) in self.counts.iter_mut().zip(other.counts.iter()) {
            *slot += v;
        }
    }

    /// Bucket counts as percentages of the total, in display order.
    ///
    /// A zero-total histogram yields all zeros rather than dividing by
    /// zero.
    #[must_use]
    pub fn percentages(&self) -> [f64; 6] {
        let total = self.total();
        if total <= 0.0 {
            return [0.0; 6];
        }
        let mut out = [0.0; 6];
        for (slot, count) in out.iter_mut().zip(self.counts.iter()) {
            *slot = 100.0 * count / total;
        }
        out
    }
}

/// Reduce a raw entry to the six fixed buckets.
///
/// Every successfully parsed count lands in exactly one bucket, so the
/// bucketed total equals the entry total.
#[must_use]
pub fn bucketize(entry: &HistogramEntry) -> BucketedHistogram {
    let mut out = BucketedHistogram::default();
    for (key, count) in entry.iter() {
        out.counts[Bucket::for_key(key).index()] += count;
    }
    out
}
