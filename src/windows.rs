//! Per-run latency-window histograms and their merged distributions.
//!
//! Each benchmark run may drop one extra CSV per (IO size, queue depth,
//! run) combination, named `hist_s{io_size}_q{queue_depth}_r{run}.csv`,
//! holding `start_us,end_us,count` rows. Files whose names do not match
//! the pattern are ignored, not errored.
//!
//! Windows from different runs are merged on the window midpoint,
//! `(start + end) / 2`. This assumes every file shares one common
//! time-bucketing scheme: if two files define different window widths
//! for the same logical run, their midpoints will not align and the
//! merge silently treats them as separate buckets. No automatic
//! re-binning is attempted.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::warn;
use serde::Serialize;

/// Which capture a window histogram belongs to, decoded from its file
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunTag {
    /// IO size in bytes.
    pub io_size: u64,
    /// Queue depth.
    pub queue_depth: u64,
    /// Repeat-run identifier.
    pub run: u64,
}

/// One latency window from one capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSample {
    pub tag: RunTag,
    /// Window start, microseconds.
    pub start: f64,
    /// Window end, microseconds.
    pub end: f64,
    /// IOs observed in this window.
    pub count: f64,
}

impl WindowSample {
    /// Canonical merge coordinate for this window.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// One midpoint of a merged distribution with its share of the series
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionPoint {
    /// Latency midpoint, microseconds.
    pub midpoint: f64,
    /// Percent of the series' total count at this midpoint.
    pub percent: f64,
}

/// Merged distribution for one (IO size, queue depth) series, summed
/// across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDistribution {
    pub io_size: u64,
    pub queue_depth: u64,
    /// Points in ascending midpoint order.
    pub points: Vec<DistributionPoint>,
}

/// Decode a `hist_s{io_size}_q{queue_depth}_r{run}.csv` file name.
#[must_use]
pub fn parse_file_name(name: &str) -> Option<RunTag> {
    let rest = name.strip_prefix("hist_s")?;
    let (io_size, rest) = take_digits(rest)?;
    let rest = rest.strip_prefix("_q")?;
    let (queue_depth, rest) = take_digits(rest)?;
    let rest = rest.strip_prefix("_r")?;
    let (run, rest) = take_digits(rest)?;
    if rest != ".csv" {
        return None;
    }
    Some(RunTag {
        io_size,
        queue_depth,
        run,
    })
}

fn take_digits(s: &str) -> Option<(u64, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = s[..len].parse().ok()?;
    Some((value, &s[len..]))
}

/// Load every matching window-histogram file in a directory.
///
/// Files whose names do not match the pattern are skipped. A missing or
/// unreadable directory yields no samples rather than an error; window
/// histograms are auxiliary data and must never sink a report. Files
/// are visited in name order so output is deterministic.
#[must_use]
pub fn load_dir(dir: &Path) -> Vec<WindowSample> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("no window histograms under {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .collect();
    paths.sort();

    let mut samples = Vec::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(tag) = parse_file_name(name) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(text) => samples.extend(parse_window_file(&text, tag)),
            Err(err) => warn!("skipping {}: {err}", path.display()),
        }
    }
    samples
}

/// Parse one window-histogram file body.
///
/// Expected columns are `start_us`, `end_us`, `count`. A column that is
/// absent or empty reads as zero; a row with a garbled numeric field is
/// skipped.
#[must_use]
pub fn parse_window_file(text: &str, tag: RunTag) -> Vec<WindowSample> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(_) => return Vec::new(),
    };
    let index_of = |name: &str| headers.iter().position(|h| h == name);
    let start_idx = index_of("start_us");
    let end_idx = index_of("end_us");
    let count_idx = index_of("count");

    let mut samples = Vec::new();
    for record in reader.records().flatten() {
        let Some(start) = field(&record, start_idx) else {
            continue;
        };
        let Some(end) = field(&record, end_idx) else {
            continue;
        };
        let Some(count) = field(&record, count_idx) else {
            continue;
        };
        samples.push(WindowSample {
            tag,
            start,
            end,
            count,
        });
    }
    samples
}

/// Numeric field of a record: zero when the column is absent or empty,
/// `None` (skip the row) when present but unparsable.
fn field(record: &csv::StringRecord, index: Option<usize>) -> Option<f64> {
    let Some(cell) = index.and_then(|i| record.get(i)) else {
        return Some(0.0);
    };
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(0.0);
    }
    cell.parse().ok()
}

/// Overall latency distribution across every sample, regardless of tag.
///
/// Counts are summed per distinct midpoint and converted to percent of
/// the grand total. Points come back in ascending midpoint order.
#[must_use]
pub fn merge_overall(samples: &[WindowSample]) -> Vec<DistributionPoint> {
    normalize(accumulate(
        samples.iter().map(|s| (s.midpoint(), s.count)).collect(),
    ))
}

/// Per-(IO size, queue depth) latency distributions, summed across runs.
///
/// Each series is normalized to percent of its own total. Series come
/// back ordered by IO size then queue depth.
#[must_use]
pub fn merge_by_group(samples: &[WindowSample]) -> Vec<GroupDistribution> {
    let mut series: BTreeMap<(u64, u64), Vec<(f64, f64)>> = BTreeMap::new();
    for sample in samples {
        series
            .entry((sample.tag.io_size, sample.tag.queue_depth))
            .or_default()
            .push((sample.midpoint(), sample.count));
    }

    series
        .into_iter()
        .map(|((io_size, queue_depth), pairs)| GroupDistribution {
            io_size,
            queue_depth,
            points: normalize(accumulate(pairs)),
        })
        .collect()
}

/// Sum counts over equal midpoints, returning ascending midpoints.
fn accumulate(mut pairs: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut out: Vec<(f64, f64)> = Vec::new();
    for (midpoint, count) in pairs {
        match out.last_mut() {
            Some(last) if last.0.total_cmp(&midpoint).is_eq() => last.1 += count,
            _ => out.push((midpoint, count)),
        }
    }
    out
}

/// Convert summed counts to percent of total. A zero total leaves every
/// point at 0% instead of dividing by zero.
fn normalize(pairs: Vec<(f64, f64)>) -> Vec<DistributionPoint> {
    let total: f64 = pairs.iter().map(|(_, c)| c).sum();
    let denom = if total > 0.0 { total } else { 1.0 };
    pairs
        .into_iter()
        .map(|(midpoint, count)| DistributionPoint {
            midpoint,
            percent: 100.0 * count / denom,
        })
        .collect()
}
