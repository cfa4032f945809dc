use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::centered_rect_fixed;

/// Render the delete confirmation. Nothing is drawn once the pending
/// task has left the snapshot.
pub fn render_delete_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(task) = app.controller().and_then(|c| c.pending_delete_task()) else {
        return;
    };

    let bg = app.theme.background;
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let bright_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let warn_style = Style::default()
        .fg(app.theme.red)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let popup_w: u16 = 50.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(4) as usize;
    let quoted = format!("\u{201c}{}\u{201d}", task.title.to_uppercase());

    let lines = vec![
        Line::from(Span::styled(" DELETE TASK?", header_style)),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", unicode::truncate_to_width(&quoted, inner_w)),
            bright_style,
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ", text_style),
            Span::styled("n", dim_style),
            Span::styled(" [NO]  ", text_style),
            Span::styled("y", dim_style),
            Span::styled(" [YES, DELETE]", warn_style),
        ]),
    ];

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::QueryState;
    use crate::tui::input::test_support::tasks_app;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, render_to_string};

    #[test]
    fn shows_pending_title() {
        let (_backend, mut app) = tasks_app(&["Feed cat"]);
        let id = app.cursor_task_id().unwrap();
        app.controller_mut().unwrap().request_delete(&id);
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_delete_confirm(frame, &app, area);
        });
        assert!(out.contains("DELETE TASK?"));
        assert!(out.contains("\u{201c}FEED CAT\u{201d}"));
        assert!(out.contains("[YES, DELETE]"));
    }

    #[test]
    fn hidden_when_task_vanished() {
        let (_backend, mut app) = tasks_app(&["Feed cat"]);
        let id = app.cursor_task_id().unwrap();
        let controller = app.controller_mut().unwrap();
        controller.request_delete(&id);
        controller.apply_query(QueryState::Ready(Vec::new()));
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_delete_confirm(frame, &app, area);
        });
        assert_eq!(out, "");
    }
}
