//! Per-core multi-value cell decoding.
//!
//! Multi-core benchmark runs report some metrics once per worker core.
//! A single cell then holds either one number, a comma-separated list
//! (one value per core), or several such lists separated by the escaped
//! newline marker (one list per sampling window). All variants flatten
//! to one list of numbers and reduce to the arithmetic mean.
//!
//! Tokens that do not parse are discarded. A cell with no parsable token
//! reduces to [`Value::Missing`], not zero: downstream aggregation must
//! be able to tell "no data" apart from "measured zero".

use crate::constants::unescape_newlines;
use crate::value::Value;

/// Flatten a per-core cell into its numeric tokens.
///
/// Escaped newline markers are expanded to real line breaks, each line is
/// split on commas, and each trimmed token is parsed as a float. Tokens
/// that fail to parse are skipped.
#[must_use]
pub fn values(cell: &str) -> Vec<f64> {
    let text = unescape_newlines(cell.trim());
    let mut out = Vec::new();
    for line in text.split('\n') {
        for token in line.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if let Ok(v) = token.parse::<f64>() {
                out.push(v);
            }
        }
    }
    out
}

/// Reduce a per-core cell to its arithmetic mean.
///
/// Returns [`Value::Missing`] when no token parses.
#[must_use]
pub fn mean(cell: &str) -> Value {
    let vals = values(cell);
    if vals.is_empty() {
        return Value::Missing;
    }
    let sum: f64 = vals.iter().sum();
    Value::Number(sum / vals.len() as f64)
}
