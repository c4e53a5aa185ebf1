pub mod cvss;
pub mod html;

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid blank run regex"));

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Collapse three or more consecutive newlines into one blank line and trim.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN_REGEX.replace_all(text, "\n\n").trim().to_string()
}

/// Cut `text` to `limit` characters, appending `...` only when something was cut.
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_text_collapses_whitespace_and_entities() {
        assert_eq!(clean_text("  Real&nbsp;Madrid \n\t wins  "), "Real Madrid wins");
        assert_eq!(clean_text("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn collapse_blank_lines_keeps_single_blank_line() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n\nc\n"), "a\n\nb\n\nc");
        assert_eq!(collapse_blank_lines("  plain  "), "plain");
    }

    #[test]
    fn truncation_leaves_short_text_alone() {
        assert_eq!(truncate_with_ellipsis("", 5), "");
        assert_eq!(truncate_with_ellipsis("abcd", 5), "abcd");
        assert_eq!(truncate_with_ellipsis("abcde", 5), "abcde");
    }

    #[test]
    fn truncation_cuts_long_text_and_marks_it() {
        assert_eq!(truncate_with_ellipsis("abcdef", 5), "abcde...");
        assert_eq!(truncate_with_ellipsis(&"x".repeat(2001), 2000), format!("{}...", "x".repeat(2000)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let arabic = "الخبر كامل";
        assert_eq!(truncate_with_ellipsis(arabic, 10), arabic);
        assert_eq!(truncate_with_ellipsis(arabic, 5), "الخبر...");
    }
}
