//! Human-readable sequence identifiers (`LEAD-0001`, `STU-0001`, `APP-0001`).
//!
//! The numeric part is allocated by a per-prefix counter row in the database
//! (see `SequenceRepo` in the db crate). This module only formats and parses
//! the resulting codes.

/// Prefix for lead codes.
pub const LEAD_PREFIX: &str = "LEAD";

/// Prefix for student codes.
pub const STUDENT_PREFIX: &str = "STU";

/// Prefix for application codes.
pub const APPLICATION_PREFIX: &str = "APP";

/// Minimum number of digits in the numeric part. Larger values simply grow.
pub const SEQUENCE_WIDTH: usize = 4;

/// Format a sequence value as `PREFIX-NNNN`.
pub fn format_sequence_id(prefix: &str, value: i64) -> String {
    format!("{prefix}-{value:0width$}", width = SEQUENCE_WIDTH)
}

/// Parse the numeric part of a code produced by [`format_sequence_id`].
///
/// Returns `None` if the prefix does not match or the suffix is not a
/// positive integer.
pub fn parse_sequence_number(prefix: &str, code: &str) -> Option<i64> {
    let digits = code.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().filter(|n| *n > 0)
}
