//! String utilities for the domain layer.
//!
//! All limits are counted in characters, not bytes, so multi-byte text is
//! never split inside a code point.

/// Marker appended to tool results that were cut at `max_tool_result_chars`.
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Keep at most `max_chars` characters of `s`.
pub fn cap_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a tool result to `max_chars`, appending [`TRUNCATION_MARKER`] if cut.
///
/// Idempotent: a result that was already truncated keeps the same first
/// `max_chars` characters, so truncating it again yields the same string.
pub fn truncate_with_marker(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => {
            let mut out = String::with_capacity(end + TRUNCATION_MARKER.len());
            out.push_str(&s[..end]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => s.to_string(),
    }
}
