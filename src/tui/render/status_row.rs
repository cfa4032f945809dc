use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, Screen};
use crate::util::unicode;

/// Always shown on the task screen
const SHORTCUTS: &str = "[N] NEW TASK | [ESC] CANCEL | [M] MOVE";

/// Render the status row (bottom of screen): key hints for the current
/// mode, or a pending status message
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let bright = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let spans: Vec<Span> = if let Some(message) = &app.status {
        vec![Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.red).bg(bg),
        )]
    } else {
        match app.screen() {
            Screen::Login => Vec::new(),
            Screen::Tasks if !app.controller().is_some_and(|c| c.is_ready()) => {
                vec![Span::styled(" [S] SIGN OUT | [Q] QUIT", dim)]
            }
            Screen::Tasks => match app.mode() {
                Mode::Navigate => vec![
                    Span::styled(format!(" {}", SHORTCUTS), bright),
                    Span::styled(
                        "  x done  e edit  d delete  S sign out  q quit",
                        dim,
                    ),
                ],
                Mode::Edit => vec![
                    Span::styled(" RENAME", bright),
                    Span::styled("  Enter save  Esc cancel", dim),
                ],
                Mode::Add => vec![
                    Span::styled(" NEW TASK", bright),
                    Span::styled("  Enter add  Esc cancel", dim),
                ],
                Mode::Confirm => vec![
                    Span::styled(" DELETE", bright),
                    Span::styled("  y delete  n keep", dim),
                ],
                Mode::Drag => vec![
                    Span::styled(" MOVE", bright),
                    Span::styled("  j/k choose position  Enter drop  Esc cancel", dim),
                ],
            },
        }
    };

    // Clip to the row width, dropping trailing hints first
    let mut clipped = Vec::new();
    let mut used = 0;
    for span in spans {
        let w = unicode::display_width(&span.content);
        if used + w <= width {
            used += w;
            clipped.push(span);
        } else {
            let rest = unicode::truncate_to_width(&span.content, width - used);
            used += unicode::display_width(&rest);
            clipped.push(Span::styled(rest, span.style));
            break;
        }
    }
    clipped.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));

    let paragraph = Paragraph::new(Line::from(clipped)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
