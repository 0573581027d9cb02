//! Input validation and decimal wire encoding.
//!
//! Every numeric value in the store is written as plain base-10 ASCII:
//! - No sign, no whitespace, no separators
//! - At least one digit
//! - Must fit in a `u64`

use alloc::string::{String, ToString};

/// Validate a name for registration.
///
/// Names are case-sensitive free text; the only rule is that they are
/// non-empty.
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
}

/// Parse a stored decimal value.
///
/// Returns `None` for anything other than one or more ASCII digits that fit
/// in a `u64`.
pub fn parse_decimal(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Format a value for storage.
#[inline]
pub fn format_decimal(value: u64) -> String {
    value.to_string()
}
