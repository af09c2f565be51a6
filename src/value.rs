//! Numeric cell values and tolerant scalar coercion.
//!
//! Benchmark exports are frequently imperfect, so cell decoding never
//! fails: a scalar cell that does not parse becomes `0.0`, while a
//! multi-value cell with no parsable token becomes [`Value::Missing`].
//! The two outcomes are kept distinct on purpose. Collapsing "no data"
//! into `0.0` would silently drag down every mean computed downstream.

use serde::{Deserialize, Serialize};

/// A decoded numeric cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A measured (or zero-coerced) number.
    Number(f64),
    /// No data. Aggregation skips this without treating it as zero.
    Missing,
}

impl Value {
    /// The contained number, if any.
    #[inline]
    #[must_use]
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Missing => None,
        }
    }

    /// The contained number, with `Missing` collapsed to `0.0`.
    ///
    /// Only for display paths that have already decided zero is an
    /// acceptable stand-in.
    #[inline]
    #[must_use]
    pub fn or_zero(self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// True if this value carries no data.
    #[inline]
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Coerce a scalar cell to a number.
///
/// Empty cells and cells that do not parse as a floating-point number
/// both yield `0.0`. This is deliberately lossy and never raises; a
/// single garbled cell must not invalidate a whole run's table.
#[must_use]
pub fn coerce(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(0.0)
}

/// [`coerce`] for a cell that may be absent entirely.
#[inline]
#[must_use]
pub fn coerce_opt(cell: Option<&str>) -> f64 {
    coerce(cell.unwrap_or(""))
}
