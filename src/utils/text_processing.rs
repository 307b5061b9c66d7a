//! Text processing utilities.
//!
//! This module contains small string helpers shared by the renderers and the
//! transport: newline handling, thousands separators, and byte-limited
//! truncation that never splits a character.

use log::*;
use regex::Regex;
use std::sync::LazyLock;

/// Glyph standing in for a line break inside a single chat line.
pub const NEWLINE_GLYPH: &str = " \u{23CE} ";

static NEWLINE_RUN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\s*\n[\n\s]*")
        .map_err(|e| warn!("Failed to compile newline pattern: {}", e))
        .ok()
});

/// Collapse runs of blank lines (and whitespace around line breaks) into a
/// single newline.
///
pub fn collapse_newlines(text: &str) -> String {
    match NEWLINE_RUN.as_ref() {
        Some(re) => re.replace_all(text, "\n").into_owned(),
        None => text.to_string(),
    }
}

/// Collapse blank-line runs, then replace each remaining newline with
/// [`NEWLINE_GLYPH`].
///
pub fn flatten_lines(text: &str) -> String {
    collapse_newlines(text).replace('\n', NEWLINE_GLYPH)
}

/// Format a count with comma thousands separators.
///
/// # Examples
/// `12345` becomes `"12,345"`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Return the longest prefix of `text` that fits in `max_bytes` without
/// splitting a character.
///
pub fn truncate_to_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Return the final path segment of a URL, ignoring any query or fragment.
///
pub fn last_path_segment(url: &str) -> &str {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("a\n\n\nb"), "a\nb");
        assert_eq!(collapse_newlines("a  \n \n  b"), "a\nb");
        assert_eq!(collapse_newlines("no breaks"), "no breaks");
    }

    #[test]
    fn test_newline_pattern_shared_across_calls() {
        assert!(NEWLINE_RUN.is_some());
        for _ in 0..3 {
            assert_eq!(collapse_newlines("a \n\n b"), "a\nb");
        }
    }

    #[test]
    fn test_flatten_lines() {
        assert_eq!(flatten_lines("one\ntwo\n\nthree"), "one ⏎ two ⏎ three");
        assert_eq!(flatten_lines("trailing\n"), "trailing ⏎ ");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12345), "12,345");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate_to_boundary() {
        assert_eq!(truncate_to_boundary("hello", 10), "hello");
        assert_eq!(truncate_to_boundary("hello", 3), "hel");
        // "é" is two bytes; never cut inside it
        assert_eq!(truncate_to_boundary("aé", 2), "a");
        assert_eq!(truncate_to_boundary("🌍🌍", 5), "🌍");
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(
            last_path_segment("https://twitter.com/user/status/123"),
            "123"
        );
        assert_eq!(
            last_path_segment("https://twitter.com/user/status/123?s=20"),
            "123"
        );
        assert_eq!(last_path_segment("https://x.com/user/status/123/"), "123");
    }
}
