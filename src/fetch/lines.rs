//! Body text to line-set normalization.

use std::collections::HashSet;

/// Splits `text` into lines, trims each, and collects them into a set.
///
/// Blank lines become the empty string; a trailing newline does not add one.
pub fn normalize_lines(text: &str) -> HashSet<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}
