//! Typed tables: reading a results file and decoding cells per column.
//!
//! A [`Table`] is the reconstructed header-plus-rows form of one results
//! file. A [`Schema`] names, per column, which decode rule applies, and
//! [`Table::records`] produces one [`TypedRecord`] per row by running
//! each declared cell through the matching decoder. Columns a schema
//! declares but the header lacks are simply absent from the records;
//! aggregation over such a column then reports "no data" instead of
//! failing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::ReadError;
use crate::percore;
use crate::rows::{self, LeadingIntId, RawRow, RowStart};
use crate::value::{coerce, Value};

/// How one column's cells are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    /// Tolerant scalar coercion; garbled cells become `0.0`.
    Scalar,
    /// Per-core multi-value cell, reduced to its mean; empty cells
    /// become [`Value::Missing`].
    PerCore,
    /// Histogram mini-format cell, kept raw for the histogram parser.
    Histogram,
    /// Free text, kept raw.
    Text,
}

/// Per-column decode rules for one table layout.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: HashMap<String, ColumnRule>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a scalar numeric column.
    #[must_use]
    pub fn scalar(mut self, name: &str) -> Self {
        self.rules.insert(name.to_string(), ColumnRule::Scalar);
        self
    }

    /// Declare several scalar numeric columns at once.
    #[must_use]
    pub fn scalars<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            self.rules.insert(name.to_string(), ColumnRule::Scalar);
        }
        self
    }

    /// Declare a per-core multi-value column.
    #[must_use]
    pub fn per_core(mut self, name: &str) -> Self {
        self.rules.insert(name.to_string(), ColumnRule::PerCore);
        self
    }

    /// Declare a histogram mini-format column.
    #[must_use]
    pub fn histogram(mut self, name: &str) -> Self {
        self.rules.insert(name.to_string(), ColumnRule::Histogram);
        self
    }

    /// Declare a free-text column.
    #[must_use]
    pub fn text(mut self, name: &str) -> Self {
        self.rules.insert(name.to_string(), ColumnRule::Text);
        self
    }

    /// Rule for a column, if declared.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<ColumnRule> {
        self.rules.get(name).copied()
    }
}

/// One decoded row: column name to decoded value, plus raw text for
/// histogram and text columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypedRecord {
    values: HashMap<String, Value>,
    text: HashMap<String, String>,
}

impl TypedRecord {
    /// Decoded value of a numeric column.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<Value> {
        self.values.get(column).copied()
    }

    /// Number in a column, `None` for missing data or undeclared columns.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.value(column).and_then(Value::as_number)
    }

    /// Raw text of a histogram or text column.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.text.get(column).map(String::as_str)
    }

    /// Store a (possibly derived) numeric value under a column name.
    pub fn set_value(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    pub(crate) fn set_text(&mut self, column: &str, raw: &str) {
        self.text.insert(column.to_string(), raw.to_string());
    }
}

/// The reconstructed contents of one results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names from the header row.
    pub header: Vec<String>,
    /// Logical rows, each exactly `header.len()` cells.
    pub rows: Vec<RawRow>,
}

impl Table {
    /// Read a results file with the default row-start rule.
    ///
    /// # Errors
    /// Fails only when the file cannot be read or the header row parses
    /// to zero columns. Everything below the header recovers silently.
    pub fn read(path: &Path) -> Result<Self, ReadError> {
        Self::read_with(path, &LeadingIntId)
    }

    /// Read a results file with a custom row-start rule.
    ///
    /// # Errors
    /// Same conditions as [`Table::read`].
    pub fn read_with<R: RowStart>(path: &Path, rule: &R) -> Result<Self, ReadError> {
        let text = fs::read_to_string(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with(&text, rule).ok_or_else(|| ReadError::EmptyHeader {
            path: path.to_path_buf(),
        })
    }

    /// Parse in-memory text with the default row-start rule.
    ///
    /// Returns `None` when the header row parses to zero columns.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_with(text, &LeadingIntId)
    }

    /// Parse in-memory text with a custom row-start rule.
    #[must_use]
    pub fn parse_with<R: RowStart>(text: &str, rule: &R) -> Option<Self> {
        rows::reconstruct(text, rule).map(|raw| Self {
            header: raw.header,
            rows: raw.rows,
        })
    }

    /// Index of a named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Decode every row into a [`TypedRecord`] per the schema.
    ///
    /// Columns without a declared rule are skipped. Decoding never
    /// fails; scalar cells coerce to `0.0` and empty per-core cells
    /// become [`Value::Missing`].
    #[must_use]
    pub fn records(&self, schema: &Schema) -> Vec<TypedRecord> {
        let columns: Vec<(usize, &str, ColumnRule)> = self
            .header
            .iter()
            .enumerate()
            .filter_map(|(i, name)| schema.rule(name).map(|rule| (i, name.as_str(), rule)))
            .collect();

        self.rows
            .iter()
            .map(|row| {
                let mut record = TypedRecord::default();
                for &(i, name, rule) in &columns {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    match rule {
                        ColumnRule::Scalar => {
                            record.set_value(name, Value::Number(coerce(cell)));
                        }
                        ColumnRule::PerCore => {
                            record.set_value(name, percore::mean(cell));
                        }
                        ColumnRule::Histogram | ColumnRule::Text => {
                            record.set_text(name, cell);
                        }
                    }
                }
                record
            })
            .collect()
    }
}

/// Add a derived bandwidth column, in MB/s, to every record.
///
/// `bandwidth = iops * io_size / (1024 * 1024)`. Records where either
/// input is missing get [`Value::Missing`] for the derived column.
pub fn derive_bandwidth(
    records: &mut [TypedRecord],
    iops_column: &str,
    size_column: &str,
    out_column: &str,
) {
    for record in records {
        let derived = match (record.number(iops_column), record.number(size_column)) {
            (Some(iops), Some(size)) => Value::Number(iops * size / (1024.0 * 1024.0)),
            _ => Value::Missing,
        };
        record.set_value(out_column, derived);
    }
}
