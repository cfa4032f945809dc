use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::centered_rect_fixed;

/// Render the login error alert. Any key dismisses it.
pub fn render_alert_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = app.auth.error.as_deref() else {
        return;
    };

    let popup_w: u16 = 52.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let bg = app.theme.background;
    let error_style = Style::default()
        .fg(app.theme.red)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines: Vec<Line> = wrap_text(" ", message, inner_w)
        .into_iter()
        .map(|s| Line::from(Span::styled(s, error_style)))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Press any key", dim_style)));

    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );
}

/// Word-wrap `text` into lines of at most `max_width` characters.
/// Every line (including the first) is prefixed with `indent`.
fn wrap_text(indent: &str, text: &str, max_width: usize) -> Vec<String> {
    let indent_len = indent.len();
    let mut lines = Vec::new();
    let mut current = indent.to_string();

    for word in text.split_whitespace() {
        let space = if current.len() == indent_len { 0 } else { 1 };
        if current.len() + space + word.len() > max_width && current.len() > indent_len {
            lines.push(current);
            current = indent.to_string();
        }
        if current.len() > indent_len {
            current.push(' ');
        }
        current.push_str(word);
    }
    if current.len() > indent_len || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::test_support::login_app;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, render_to_string};

    #[test]
    fn shows_message() {
        let (_backend, mut app) = login_app();
        app.auth.error = Some("ERROR: Failed to send code".into());
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_alert_popup(frame, &app, area);
        });
        assert!(out.contains("ERROR: Failed to send code"));
        assert!(out.contains("Press any key"));
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text(" ", "one two three four", 10),
            vec![" one two", " three", " four"]
        );
        assert_eq!(wrap_text(" ", "", 10), vec![" "]);
    }
}
