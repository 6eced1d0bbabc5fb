//! String helpers over [`Value`] strings.
//!
//! Design notes:
//! - Offsets and lengths are in bytes, not codepoints
//! - A cut through a multi-byte character is repaired lossily
//! - Trimming is ASCII-only

use crate::values::{Array, Value};

// ============================================================================
// Slicing and searching
// ============================================================================

/// Resolve a signed offset against `len`: negative counts from the end.
/// The result is clamped to `0..=len`.
fn offset(len: usize, at: i64) -> usize {
    if at < 0 {
        len.saturating_sub(at.unsigned_abs() as usize)
    } else {
        (at as usize).min(len)
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Extract `len` bytes starting at `from`.
///
/// A negative `from` counts back from the end; a negative `len` leaves that
/// many bytes off the end. Out-of-range bounds are clamped, so the result is
/// never an error, only possibly empty.
pub fn substr(s: &str, from: i64, len: i64) -> String {
    let bytes = s.as_bytes();
    let start = offset(bytes.len(), from);
    let end = if len < 0 {
        offset(bytes.len(), len)
    } else {
        start.saturating_add(len as usize).min(bytes.len())
    };
    if end <= start {
        return String::new();
    }
    lossy(&bytes[start..end])
}

/// Byte offset of the first `needle` at or after `start`, or `None`.
///
/// A negative `start` counts back from the end. An empty needle matches at
/// `start` itself.
pub fn find(haystack: &str, needle: &str, start: i64) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let start = offset(bytes.len(), start);
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(start);
    }
    bytes[start..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|found| start + found)
}

// ============================================================================
// Splitting and joining
// ============================================================================

/// Split `s` on every occurrence of `sep` into an array of strings.
///
/// When `sep` never occurs (or is empty) the whole string is the single
/// element, so `split("", sep)` is `[""]`.
pub fn split(s: &str, sep: &str) -> Value {
    let parts = Array::new();
    if sep.is_empty() {
        parts.push(Value::string(s));
    } else {
        for part in s.split(sep) {
            parts.push(Value::string(part));
        }
    }
    Value::Array(parts)
}

/// Stringify each element of `items` and join them with `sep`.
///
/// A non-array is joined as if it were a one-element array.
pub fn join(sep: &str, items: &Value) -> String {
    match items {
        Value::Array(items) => items
            .borrow()
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(sep),
        other => other.to_string(),
    }
}

// ============================================================================
// Trimming (ASCII-only)
// ============================================================================

pub fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

pub fn ltrim(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

pub fn rtrim(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii_whitespace())
}

// ============================================================================
// In-place mutation
// ============================================================================

/// Append `tail` to the string in `target`.
///
/// A string is extended in place, so every handle sharing it sees the new
/// content (and any cached compiled path is dropped). Anything else is first
/// replaced by its stringified form.
pub fn append(target: &mut Value, tail: &str) {
    match target {
        Value::Str(s) => s.append(tail),
        other => {
            let mut text = other.to_string();
            text.push_str(tail);
            *other = Value::string(text);
        }
    }
}
