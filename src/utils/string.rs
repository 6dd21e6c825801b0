//! UTF-8 safe string previews for request logs.
//!
//! Model output routinely contains emoji and degree signs, so truncation is
//! done on chars, never on byte offsets.

/// Return the first `n` characters of `s` as a `String` (no ellipsis).
pub fn prefix_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Return a preview of `s` up to `n` characters, with a trailing `...` when
/// something was cut off.
pub fn preview(s: &str, n: usize) -> String {
    let mut prefix = prefix_chars(s, n);
    if s.chars().nth(n).is_some() {
        prefix.push_str("...");
    }
    prefix
}

/// Collapse runs of whitespace (including newlines) into single spaces.
///
/// Model replies are often pretty-printed JSON; a log line should stay on
/// one line.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One-line preview of `s`, at most `n` characters plus ellipsis.
pub fn log_preview(s: &str, n: usize) -> String {
    preview(&single_line(s), n)
}
