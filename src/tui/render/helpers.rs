use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::util::TextInput;
use crate::util::unicode;

/// Rect of the given size centered in `area`, clipped to it
pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Spans for a text field `width` cells wide. Shows `placeholder` when
/// empty. Long input scrolls so the cursor stays visible. Returns the
/// spans and the cursor column relative to the field start.
pub(super) fn input_spans(
    input: &TextInput,
    placeholder: &str,
    width: usize,
    text_style: Style,
    placeholder_style: Style,
) -> (Vec<Span<'static>>, u16) {
    if input.text().is_empty() {
        let shown = unicode::truncate_to_width(placeholder, width);
        return (vec![Span::styled(shown, placeholder_style)], 0);
    }
    let cursor_col = input.cursor_col();
    let text = input.text();
    // Drop leading graphemes until the cursor fits.
    let mut start = 0;
    while cursor_col.saturating_sub(unicode::byte_offset_to_display_col(text, start)) >= width
        && let Some(next) = unicode::next_grapheme_boundary(text, start)
    {
        start = next;
    }
    let skipped = unicode::byte_offset_to_display_col(text, start);
    let visible = unicode::truncate_to_width(&text[start..], width);
    let col = cursor_col.saturating_sub(skipped).min(width.saturating_sub(1));
    (vec![Span::styled(visible, text_style)], col as u16)
}

/// Spaces needed to push `right` to the edge after `left`
pub(super) fn gap(total: usize, left: usize, right: usize) -> usize {
    total.saturating_sub(left + right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clips_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect_fixed(30, 20, area), Rect::new(0, 0, 20, 10));
    }

    #[test]
    fn input_shows_placeholder_when_empty() {
        let input = TextInput::new();
        let (spans, col) = input_spans(&input, "you@example.com", 30, Style::default(), Style::default());
        assert_eq!(spans[0].content, "you@example.com");
        assert_eq!(col, 0);
    }

    #[test]
    fn long_input_scrolls_to_cursor() {
        let mut input = TextInput::new();
        input.set("abcdefghijklmnop");
        let (spans, col) = input_spans(&input, "", 10, Style::default(), Style::default());
        assert!(spans[0].content.ends_with('p') || spans[0].content.ends_with('\u{2026}'));
        assert!(col < 10);
    }
}
