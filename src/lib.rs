//! `benchsift` - Tolerant ingestion and aggregation of storage/IO
//! micro-benchmark CSV exports.
//!
//! Benchmark harnesses export results as CSV that is frequently dirty:
//! logical rows wrapped across physical lines, cells holding one value
//! per worker core, cells embedding a compact histogram, and the odd
//! garbled number. This crate repairs and decodes that data into clean,
//! aggregated numeric series for a reporting layer to consume.
//!
//! # Pipeline
//!
//! 1. [`Table::read`] reconstructs logical rows from physical lines
//!    (see below) and pairs them with the header.
//! 2. [`Table::records`] decodes each cell per a [`Schema`]: scalar
//!    coercion, per-core mean reduction, or raw retention for histogram
//!    and text cells.
//! 3. [`group_mean`], [`stage_shares`], [`bucket_shares`] and the
//!    [`windows`] mergers reduce records into the series a report plots.
//!
//! # Row reconstruction
//!
//! The first column of every known input is a monotonically increasing
//! integer row ID, so a physical line starting with digits followed by a
//! comma begins a new logical row and any other line continues the
//! previous one. Continuation lines are re-joined with the escaped
//! newline marker (`\n` as two characters), then each logical row is
//! tokenized with a comma/quote-aware parser and padded with empty
//! cells to the header width. This rule is an input-format assumption,
//! kept behind [`RowStart`] so it can be replaced, and the padding is a
//! documented lossy recovery, never an error.
//!
//! # Tolerance policy
//!
//! | Defect                          | Outcome                          |
//! |---------------------------------|----------------------------------|
//! | garbled scalar cell             | coerced to `0.0`                 |
//! | per-core cell with no numbers   | [`Value::Missing`]               |
//! | malformed histogram token       | token skipped                    |
//! | short or over-long logical row  | padded / truncated to header     |
//! | window file with odd name       | file ignored                     |
//! | aggregating an absent column    | empty result ("skip the series") |
//! | missing input file, zero-column header | [`ReadError`] (fatal)     |
//!
//! The distinction between "coerced to zero" and "missing" is load
//! bearing: means skip missing values instead of being dragged to zero.
//!
//! # Example
//! ```
//! use benchsift::{group_mean, Schema, Table};
//!
//! let csv = "\
//! Run_ID,QD,IOPS,p99_Latency
//! 0,1,1000,11.5
//! 1,1,1200,12.5
//! 2,4,3000,31.0
//! ";
//! let table = Table::parse(csv).unwrap();
//! let schema = Schema::new()
//!     .scalars(["Run_ID", "QD", "IOPS"])
//!     .per_core("p99_Latency");
//! let records = table.records(&schema);
//!
//! let iops = group_mean(&records, &["QD"], "IOPS");
//! assert_eq!(iops.len(), 2);
//! assert_eq!(iops[0].mean, 1100.0); // QD=1
//! assert_eq!(iops[1].mean, 3000.0); // QD=4
//! ```
//!
//! All transformations are pure and single-threaded; independent
//! aggregation requests may be run in parallel by the caller with no
//! extra synchronization.

mod aggregate;
mod constants;
mod error;
mod histogram;
mod percore;
mod rows;
mod table;
mod value;
pub mod windows;

#[cfg(test)]
mod tests;

// Re-export public API
pub use aggregate::{
    bucket_shares, group_mean, stage_shares, total_histogram, AggregatedGroup, BucketShares,
    GroupKey, KeyValue, StageBreakdown, StageShare,
};
pub use error::ReadError;
pub use histogram::{bucketize, parse_hist, Bucket, BucketKey, BucketedHistogram, HistogramEntry};
pub use percore::{mean as per_core_mean, values as per_core_values};
pub use rows::{reconstruct, LeadingIntId, RawRow, RawTable, RowStart};
pub use table::{derive_bandwidth, ColumnRule, Schema, Table, TypedRecord};
pub use value::{coerce, coerce_opt, Value};
