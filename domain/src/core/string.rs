//! Character-counted string utilities for the domain layer.
//!
//! Lengths are measured in `char`s so that budgets mean the same thing for
//! ASCII and multi-byte text, and slicing never splits a code point.

/// Number of characters in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` characters of `s`
pub fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// The last `n` characters of `s`
pub fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Truncate to at most `max_len` characters, ending with `...` when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if char_len(s) <= max_len {
        s.to_string()
    } else if max_len < 3 {
        head_chars(s, max_len).to_string()
    } else {
        format!("{}...", head_chars(s, max_len - 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_and_tail_ascii() {
        assert_eq!(head_chars("hello world", 5), "hello");
        assert_eq!(tail_chars("hello world", 5), "world");
        assert_eq!(head_chars("hi", 10), "hi");
        assert_eq!(tail_chars("hi", 10), "hi");
        assert_eq!(tail_chars("hi", 0), "");
    }

    #[test]
    fn test_head_and_tail_multibyte() {
        assert_eq!(head_chars("日本語テスト", 2), "日本");
        assert_eq!(tail_chars("日本語テスト", 3), "テスト");
        assert_eq!(tail_chars("👋🌍🎉", 1), "🎉");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("日本語テスト文字列", 5), "日本...");
        assert_eq!(truncate("hello", 2), "he");
    }
}
