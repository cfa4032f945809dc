use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Number of user-perceived characters
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Truncate to fit within `max_cells` terminal cells, appending `…` if cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut result = String::new();
    for g in s.graphemes(true) {
        let gw = display_width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(g);
    }
    result.push('\u{2026}');
    result
}

/// Next grapheme boundary after `byte_offset`, or None at the end.
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset >= s.len() {
        return None;
    }
    match s[byte_offset..].grapheme_indices(true).nth(1) {
        Some((i, _)) => Some(byte_offset + i),
        None => Some(s.len()),
    }
}

/// Previous grapheme boundary before `byte_offset`, or None at the start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    s[..byte_offset]
        .grapheme_indices(true)
        .last()
        .map(|(i, _)| i)
}

/// Display column of a byte offset
pub fn byte_offset_to_display_col(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

/// Start of the word left of `byte_offset` (whitespace-delimited).
pub fn word_boundary_left(s: &str, byte_offset: usize) -> usize {
    let graphemes: Vec<(usize, &str)> = s[..byte_offset.min(s.len())]
        .grapheme_indices(true)
        .collect();
    let is_space = |g: &str| g.chars().all(char::is_whitespace);

    let mut idx = graphemes.len();
    while idx > 0 && is_space(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_space(graphemes[idx - 1].1) {
        idx -= 1;
    }
    graphemes.get(idx).map_or(0, |(i, _)| *i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
    }

    #[test]
    fn grapheme_count_counts_clusters() {
        assert_eq!(grapheme_count("e\u{301}x"), 2);
        assert_eq!(grapheme_count(""), 0);
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 6), "hello\u{2026}");
        assert_eq!(truncate_to_width("hi", 6), "hi");
        assert_eq!(truncate_to_width("hello", 1), "\u{2026}");
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn grapheme_boundaries_step_over_combining_marks() {
        let s = "ae\u{301}b";
        assert_eq!(next_grapheme_boundary(s, 0), Some(1));
        assert_eq!(next_grapheme_boundary(s, 1), Some(4));
        assert_eq!(next_grapheme_boundary(s, 5), None);
        assert_eq!(prev_grapheme_boundary(s, 4), Some(1));
        assert_eq!(prev_grapheme_boundary(s, 0), None);
    }

    #[test]
    fn word_boundary_skips_trailing_space() {
        let s = "buy oat milk  ";
        assert_eq!(word_boundary_left(s, s.len()), 8);
        assert_eq!(word_boundary_left(s, 8), 4);
        assert_eq!(word_boundary_left(s, 2), 0);
        assert_eq!(word_boundary_left("", 0), 0);
    }

    #[test]
    fn display_col_of_offset() {
        assert_eq!(byte_offset_to_display_col("日本x", 3), 2);
        assert_eq!(byte_offset_to_display_col("ab", 10), 2);
    }
}
