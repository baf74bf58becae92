pub mod markdown;

use chrono::{DateTime, Local, Utc};
use unicode_width::UnicodeWidthChar;

/// Shorten `s` to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// "Mar 5, 2024" in local time.
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %Y").to_string()
}

/// "Mar 5, 2024 14:07" in local time.
pub fn format_date_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %Y %H:%M").to_string()
}

/// Visual lines of `text` wrapped at `max_width` columns, with trailing
/// whitespace trimmed as ratatui's `Wrap { trim: true }` does. Each entry is
/// (line_text, start_char, end_char) in character positions.
fn wrapped_lines(text: &str, max_width: usize) -> Vec<(String, usize, usize)> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    let mut start = 0;
    let mut count = 0;

    for (pos, ch) in text.chars().enumerate() {
        count = pos + 1;
        if ch == '\n' {
            lines.push((current.trim_end().to_string(), start, pos));
            current.clear();
            width = 0;
            start = pos + 1;
            continue;
        }

        let ch_width = ch.width().unwrap_or(1);
        if width + ch_width > max_width && width > 0 {
            lines.push((current.trim_end().to_string(), start, pos));
            current = ch.to_string();
            width = ch_width;
            start = pos;
        } else {
            current.push(ch);
            width += ch_width;
        }
    }

    if !current.is_empty() || text.ends_with('\n') {
        lines.push((current.trim_end().to_string(), start, count));
    }

    lines
}

/// Line and column of a cursor (a character position) inside wrapped text.
pub fn wrapped_cursor_position(text: &str, cursor: usize, max_width: usize) -> (usize, usize) {
    if text.is_empty() || cursor == 0 || max_width == 0 {
        return (0, 0);
    }

    let lines = wrapped_lines(text, max_width);

    if let Some((row, (_, start, _))) = lines
        .iter()
        .enumerate()
        .find(|(_, (_, start, end))| cursor >= *start && cursor <= *end)
    {
        return (row, cursor - start);
    }

    match lines.last() {
        Some((last, _, end)) if cursor >= *end => {
            (lines.len() - 1, last.chars().count())
        }
        _ => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_short_input_untouched() {
        assert_eq!(truncate_string("Cells", 20), "Cells");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn test_truncate_string_adds_ellipsis() {
        let result = truncate_string("Photosynthesis and the Calvin cycle", 20);
        assert_eq!(result, "Photosynthesis an...");
        assert_eq!(result.chars().count(), 20);
    }

    #[test]
    fn test_truncate_string_multibyte_safe() {
        assert_eq!(truncate_string("Überprüfung der Zellteilung", 8), "Überp...");
    }

    #[test]
    fn test_format_date_shape() {
        let at: DateTime<Utc> = "2024-03-05T12:00:00Z".parse().unwrap();
        let text = format_date(&at);
        assert!(text.starts_with("Mar "));
        assert!(text.ends_with("2024"));
    }

    #[test]
    fn test_cursor_at_start_or_empty() {
        assert_eq!(wrapped_cursor_position("", 0, 10), (0, 0));
        assert_eq!(wrapped_cursor_position("Hello", 0, 10), (0, 0));
    }

    #[test]
    fn test_cursor_single_line() {
        assert_eq!(wrapped_cursor_position("Hello", 3, 10), (0, 3));
    }

    #[test]
    fn test_cursor_wraps_to_next_line() {
        let text = "This is a long line that should wrap";
        assert_eq!(wrapped_cursor_position(text, 15, 10), (1, 5));
    }

    #[test]
    fn test_cursor_at_exact_boundary_stays_on_line() {
        assert_eq!(wrapped_cursor_position("0123456789", 10, 10), (0, 10));
        assert_eq!(wrapped_cursor_position("0123456789A", 11, 10), (1, 1));
    }

    #[test]
    fn test_cursor_beyond_text_clamps_to_end() {
        assert_eq!(wrapped_cursor_position("Hi", 10, 10), (0, 2));
    }

    #[test]
    fn test_explicit_newlines_split_lines() {
        let lines = wrapped_lines("# Title\n- one\n- two", 20);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0, "# Title");
        assert_eq!(lines[2].0, "- two");
        assert_eq!(wrapped_cursor_position("Line 1\nLine 2", 8, 20), (1, 1));
    }

    #[test]
    fn test_cursor_counts_characters_not_bytes() {
        let text = "äöü\nß";
        assert_eq!(wrapped_cursor_position(text, 5, 20), (1, 1));
    }
}
