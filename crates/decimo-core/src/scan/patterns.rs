//! Regex patterns used by the number scanner.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Maximal run of ASCII digits. `\d` would also match non-ASCII digits.
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Length of a ticket number.
pub const NUMBER_LEN: usize = 5;

/// Shortest digit run treated as a barcode-like sequence.
pub const MIN_SEQUENCE_LEN: usize = 10;
