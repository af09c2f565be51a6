//! Tolerant reconstruction of logical rows from physical lines.
//!
//! Some exporters serialize a logical row across several physical lines
//! when a cell legitimately contains line breaks (for example a per-core
//! list captured once per worker). This module stitches those lines back
//! into logical rows whose cell count matches the header.
//!
//! # Input-format precondition
//!
//! Reassembly relies on one encoding-specific assumption: the first
//! column of every known input is a monotonically increasing integer row
//! ID, so a physical line that starts with digits followed by a comma
//! begins a new logical row, and any other line continues the previous
//! one. This is not general-purpose CSV repair. The rule lives behind
//! [`RowStart`] so it can be swapped if the upstream export format ever
//! changes.
//!
//! # Recovery policy
//!
//! A reconstructed row that tokenizes to fewer cells than the header is
//! right-padded with empty cells. This is deliberately lossy: if the
//! truly missing field was in the middle of the row, padding shifts the
//! remaining cells left and mis-aligns them. The exporter's failure mode
//! decides the correct remediation, so the crate keeps the policy simple
//! and documented instead of guessing.

use log::debug;

use crate::constants::ESCAPED_NEWLINE;

/// One logical row: one cell per header column, always exactly as many
/// cells as the header.
pub type RawRow = Vec<String>;

/// Rule deciding whether a physical line begins a new logical row.
pub trait RowStart {
    /// True if `line` starts a new logical row.
    fn is_row_start(&self, line: &str) -> bool;
}

/// Default rule: the line starts with one or more ASCII digits followed
/// by a comma (the integer row-ID column every known exporter writes
/// first).
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingIntId;

impl RowStart for LeadingIntId {
    fn is_row_start(&self, line: &str) -> bool {
        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        digits > 0 && line.as_bytes().get(digits) == Some(&b',')
    }
}

/// Header plus reconstructed rows, before any typing is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the first physical line.
    pub header: Vec<String>,
    /// Logical rows, each exactly `header.len()` cells.
    pub rows: Vec<RawRow>,
}

/// Reconstruct logical rows from raw file text.
///
/// The first physical line is the header. Each later line either starts
/// a new logical row (per `rule`) or is joined onto the previous one
/// with the escaped newline marker. Buffered rows are then tokenized
/// with a comma/quote-aware parser and padded (or, for over-long rows,
/// truncated) to the header width. Continuation lines seen before any
/// row start, and empty lines, are discarded.
///
/// Returns `None` when there is no header line or the header tokenizes
/// to zero columns; that is the caller's only fatal condition.
#[must_use]
pub fn reconstruct<R: RowStart>(text: &str, rule: &R) -> Option<RawTable> {
    let mut lines = text.lines();
    let header = tokenize(lines.next()?);
    if header.is_empty() {
        return None;
    }
    let width = header.len();

    let mut buffers: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if rule.is_row_start(line) {
            buffers.push(line.to_string());
        } else if let Some(last) = buffers.last_mut() {
            last.push_str(ESCAPED_NEWLINE);
            last.push_str(line);
        }
        // A continuation before any row start has nothing to attach to.
    }

    let mut rows = Vec::with_capacity(buffers.len());
    for buffer in &buffers {
        let mut cells = tokenize(buffer);
        if cells.len() < width {
            debug!(
                "padding row from {} to {} cells: {:.40}",
                cells.len(),
                width,
                buffer
            );
            cells.resize(width, String::new());
        } else if cells.len() > width {
            debug!(
                "truncating row from {} to {} cells: {:.40}",
                cells.len(),
                width,
                buffer
            );
            cells.truncate(width);
        }
        rows.push(cells);
    }

    Some(RawTable { header, rows })
}

/// Tokenize one logical-row string with a comma/quote-aware parser.
///
/// An empty or unreadable string yields no cells.
pub(crate) fn tokenize(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
