use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ops::auth_flow::AuthStep;
use crate::tui::app::App;

use super::helpers::{centered_rect_fixed, input_spans};

const FORM_W: u16 = 48;

/// Render the email or code form
pub fn render_login_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let input_style = Style::default().fg(app.theme.text_bright).bg(app.theme.selection_bg);
    let placeholder_style = Style::default().fg(app.theme.dim).bg(app.theme.selection_bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);
    let button_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let busy = app.auth.is_busy();
    let (title, subtitle, label, input, placeholder, button, busy_label, hints) =
        match &app.auth.step {
            AuthStep::EmailEntry => (
                "SPRINTONE TODO",
                "SIGN IN WITH A MAGIC CODE".to_string(),
                "EMAIL ADDRESS",
                &app.auth.email,
                "you@example.com",
                "[SEND MAGIC CODE]",
                "SENDING...",
                "Enter send  Esc quit",
            ),
            AuthStep::CodeVerification { email } => (
                "ENTER CODE",
                format!("WE SENT A CODE TO {}", email.to_uppercase()),
                "VERIFICATION CODE",
                &app.auth.code,
                "123456",
                "[VERIFY CODE]",
                "VERIFYING...",
                "Enter verify  Esc back",
            ),
        };

    let popup_w = FORM_W.min(area.width);
    let inner_w = popup_w.saturating_sub(4) as usize;
    let (field, cursor_col) = input_spans(input, placeholder, inner_w, input_style, placeholder_style);
    let field_w = super::helpers::spans_width(&field);
    let mut field_line = vec![Span::styled(" ", text_style)];
    field_line.extend(field);
    field_line.push(Span::styled(
        " ".repeat(inner_w.saturating_sub(field_w)),
        input_style,
    ));

    let lines = vec![
        Line::from(Span::styled(format!(" {}", title), header_style)),
        Line::from(Span::styled(format!(" {}", subtitle), text_style)),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", label), label_style)),
        Line::from(field_line),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", if busy { busy_label } else { button }),
            button_style,
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", hints), dim_style)),
    ];

    let popup_h = (lines.len() as u16) + 2;
    let form_area = centered_rect_fixed(popup_w, popup_h, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.text_bright).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), form_area);

    // Field is on the fifth content row, after the border and one space
    if !busy && app.auth.error.is_none() {
        frame.set_cursor_position(Position::new(
            form_area.x + 2 + cursor_col,
            form_area.y + 1 + 4,
        ));
    }
}
