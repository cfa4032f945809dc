use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::{centered_rect_fixed, input_spans, spans_width};

/// Render the new-task dialog
pub fn render_add_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(controller) = app.controller() else {
        return;
    };

    let bg = app.theme.background;
    let highlight = app.theme.highlight;
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);
    let input_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(app.theme.selection_bg);
    let placeholder_style = Style::default().fg(app.theme.dim).bg(app.theme.selection_bg);

    let popup_w: u16 = 56.min(area.width.saturating_sub(2));
    let field_w = popup_w.saturating_sub(4) as usize;

    let (field, cursor_col) = input_spans(
        &controller.add_input,
        "WHAT NEEDS TO BE DONE?",
        field_w,
        input_style,
        placeholder_style,
    );
    let used = spans_width(&field);
    let mut field_line = vec![Span::styled(" ", text_style)];
    field_line.extend(field);
    field_line.push(Span::styled(" ".repeat(field_w.saturating_sub(used)), input_style));

    let lines = vec![
        Line::from(Span::styled(" NEW TASK", header_style)),
        Line::from(""),
        Line::from(field_line),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ", text_style),
            Span::styled("Esc", dim_style),
            Span::styled(" [CANCEL]  ", text_style),
            Span::styled("Enter", dim_style),
            Span::styled(
                " [ADD TASK]",
                Style::default().fg(highlight).bg(bg).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(highlight).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );

    frame.set_cursor_position(Position::new(
        overlay_area.x + 2 + cursor_col,
        overlay_area.y + 3,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::test_support::tasks_app;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, render_to_string};

    #[test]
    fn shows_placeholder_then_input() {
        let (_backend, mut app) = tasks_app(&[]);
        app.controller_mut().unwrap().open_add();
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_add_popup(frame, &app, area);
        });
        assert!(out.contains("NEW TASK"));
        assert!(out.contains("WHAT NEEDS TO BE DONE?"));
        assert!(out.contains("[ADD TASK]"));

        app.controller_mut().unwrap().add_input.set("Water plants");
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_add_popup(frame, &app, area);
        });
        assert!(out.contains("Water plants"));
        assert!(!out.contains("WHAT NEEDS TO BE DONE?"));
    }
}
