use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::centered_rect_fixed;

const BANNER: &str = "TASK DONE!";

/// Flash shown for a moment after a task is completed
pub fn render_celebration(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let accent = app.theme.highlight;

    let popup_w = (BANNER.len() as u16 + 10).min(area.width);
    let overlay_area = centered_rect_fixed(popup_w, 5, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(accent).bg(bg))
        .style(Style::default().bg(bg));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            BANNER,
            Style::default()
                .fg(accent)
                .bg(bg)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        ))
        .centered(),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::test_support::login_app;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, render_to_string};

    #[test]
    fn banner() {
        let (_backend, app) = login_app();
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_celebration(frame, &app, area);
        });
        assert!(out.contains("TASK DONE!"));
    }
}
