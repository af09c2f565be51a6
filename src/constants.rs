//! Internal constants shared by the cell decoders and the row reconstructor.

/// Two-character marker standing in for a line break inside a cell.
///
/// Exporters write a literal backslash followed by `n` so that one logical
/// row stays on one physical line. The row reconstructor also inserts this
/// marker when it re-joins a row that was split across physical lines.
pub(crate) const ESCAPED_NEWLINE: &str = "\\n";

/// Escaped carriage return, treated the same as [`ESCAPED_NEWLINE`].
pub(crate) const ESCAPED_CR: &str = "\\r";

/// Suffix marking a histogram key as an overflow sentinel ("this many or more").
pub(crate) const OVERFLOW_SUFFIX: char = '+';

/// Replace escaped line-break markers with real newlines.
///
/// Both the `\n` and `\r` markers become a real `\n` so callers can split
/// on a single separator.
pub(crate) fn unescape_newlines(text: &str) -> String {
    text.replace(ESCAPED_CR, "\n").replace(ESCAPED_NEWLINE, "\n")
}

/// True if the token consists only of characters that can appear in a
/// decimal or scientific-notation number.
///
/// Rejects tokens such as `inf` or `NaN` that `f64::from_str` would accept.
pub(crate) fn is_numeric_shaped(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'e' | 'E' | '+' | '-' | '.'))
}
