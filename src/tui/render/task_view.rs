use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::backend::QueryState;
use crate::model::task::{Task, checkbox};
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::{gap, input_spans, spans_width};

/// Drag handle shown at the start of every row
pub(super) const GRIP: &str = "\u{2261}";

const SIGN_OUT: &str = "[SIGN OUT]";

/// Render the signed-in screen: header, counters and the list, or the
/// loading / error screen while the query is not ready
pub fn render_task_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let Some(controller) = app.controller() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // separator
            Constraint::Length(1), // counters
            Constraint::Length(1), // spacer
            Constraint::Min(1),    // task list
        ])
        .split(area);

    // The header stays up while not ready so sign-out is always reachable.
    let message = match controller.query() {
        QueryState::Loading => Some((
            "LOADING...".to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )),
        QueryState::Error(message) => Some((
            format!("ERROR: {}", message),
            Style::default().fg(app.theme.red).bg(bg),
        )),
        QueryState::Ready(_) => None,
    };

    render_header(frame, app, chunks[0]);
    let rule = "\u{2500}".repeat(chunks[1].width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(rule, Style::default().fg(app.theme.dim).bg(bg))),
        chunks[1],
    );
    if let Some((text, style)) = message {
        let rest = Rect::new(
            area.x,
            chunks[2].y,
            area.width,
            area.height.saturating_sub(chunks[2].y - area.y),
        );
        render_message(frame, rest, &text, style);
        return;
    }
    render_counters(frame, app, chunks[2]);
    render_list(frame, app, chunks[4]);
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let width = unicode::display_width(text).min(area.width as usize) as u16;
    let rect = super::helpers::centered_rect_fixed(width.max(1), 1, area);
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_string(), style.add_modifier(Modifier::BOLD))),
        rect,
    );
}

fn render_header(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let email = app
        .controller()
        .map(|c| c.user().email.to_uppercase())
        .unwrap_or_default();

    let left = vec![Span::styled(
        " TASKS",
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let right = vec![
        Span::styled(email, Style::default().fg(app.theme.text).bg(bg)),
        Span::styled("  ", Style::default().bg(bg)),
        Span::styled(
            SIGN_OUT,
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default().bg(bg)),
    ];
    let left_w = spans_width(&left);
    let right_w = spans_width(&right);
    let padding = gap(area.width as usize, left_w, right_w);

    // Remember where the button landed for mouse clicks.
    let button_x = (left_w + padding + right_w).saturating_sub(SIGN_OUT.len() + 1);
    app.sign_out_area = if left_w + right_w <= area.width as usize {
        Rect::new(area.x + button_x as u16, area.y, SIGN_OUT.len() as u16, 1)
    } else {
        Rect::default()
    };

    let mut spans = left;
    spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
    spans.extend(right);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_counters(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let Some(controller) = app.controller() else {
        return;
    };
    let list = controller.list();
    let bold = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(" \u{25A1} ", Style::default().fg(app.theme.text_bright).bg(bg)),
        Span::styled(format!("{} PENDING", list.pending_count()), bold),
        Span::styled("    ", Style::default().bg(bg)),
        Span::styled("\u{25A0} ", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(format!("{} COMPLETED", list.completed_count()), bold),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    app.list_area = area;
    let bg = app.theme.background;
    let height = area.height as usize;

    let len = app.controller().map_or(0, |c| c.list().len());
    if len == 0 {
        render_empty(frame, app, area);
        return;
    }

    // Keep the cursor (or the drop target while dragging) on screen.
    let focus_row = app.drag.as_ref().map_or(app.cursor, |d| d.hover);
    if focus_row < app.scroll_offset {
        app.scroll_offset = focus_row;
    } else if height > 0 && focus_row >= app.scroll_offset + height {
        app.scroll_offset = focus_row + 1 - height;
    }
    app.scroll_offset = app.scroll_offset.min(len.saturating_sub(1));

    let Some(controller) = app.controller() else {
        return;
    };
    let editing = controller.editing();
    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(height);
    let mut cursor_pos: Option<Position> = None;

    for (index, task) in controller
        .list()
        .tasks()
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
    {
        let row_y = area.y + (index - app.scroll_offset) as u16;
        let selected = index == app.cursor && app.drag.is_none();
        let dragging = app.drag.as_ref().filter(|d| d.active);
        let is_source = dragging.is_some_and(|d| d.task_id == task.id);
        let is_target = dragging.is_some_and(|d| d.hover == index && d.task_id != task.id);
        let row_bg = if selected || is_target {
            app.theme.selection_bg
        } else {
            bg
        };

        let marker = if is_target {
            Span::styled(
                "\u{25B8}",
                Style::default().fg(app.theme.selection_border).bg(row_bg),
            )
        } else if selected {
            Span::styled(
                "\u{258E}",
                Style::default().fg(app.theme.selection_border).bg(row_bg),
            )
        } else {
            Span::styled(" ", Style::default().bg(row_bg))
        };

        let mut spans = vec![
            marker,
            Span::styled(
                format!("{} ", GRIP),
                Style::default().fg(app.theme.dim).bg(row_bg),
            ),
        ];

        if let Some(slot) = editing.filter(|slot| slot.id == task.id) {
            // Inline rename
            let prefix_w = spans_width(&spans);
            let field_w = width.saturating_sub(prefix_w + 1);
            let input_style = Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD);
            let (field, col) = input_spans(&slot.input, "", field_w, input_style, input_style);
            let used = spans_width(&field);
            spans.extend(field);
            spans.push(Span::styled(
                " ".repeat(field_w.saturating_sub(used)),
                input_style,
            ));
            cursor_pos = Some(Position::new(area.x + prefix_w as u16 + col, row_y));
        } else {
            spans.extend(task_spans(app, task, row_bg, is_source, width.saturating_sub(3)));
        }

        let used = spans_width(&spans);
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(row_bg)));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
    if let Some(pos) = cursor_pos {
        frame.set_cursor_position(pos);
    }
}

/// Checkbox and title. The dragged task's own row is drawn dimmed.
pub(super) fn task_spans(
    app: &App,
    task: &Task,
    row_bg: ratatui::style::Color,
    placeholder: bool,
    width: usize,
) -> Vec<Span<'static>> {
    let box_style = if task.completed {
        Style::default().fg(app.theme.highlight).bg(row_bg)
    } else {
        Style::default().fg(app.theme.text).bg(row_bg)
    };
    let mut title_style = Style::default()
        .fg(app.theme.task_color(task.completed))
        .bg(row_bg)
        .add_modifier(Modifier::BOLD);
    if task.completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if placeholder {
        title_style = Style::default().fg(app.theme.dim).bg(row_bg);
    }
    let title = unicode::truncate_to_width(&task.title, width.saturating_sub(4));
    vec![
        Span::styled(checkbox(task.completed), box_style),
        Span::styled(" ", Style::default().bg(row_bg)),
        Span::styled(title, title_style),
    ]
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "NO TASKS YET",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(""),
        Line::from(Span::styled(
            "PRESS N TO ADD YOUR FIRST TASK",
            Style::default().fg(app.theme.dim).bg(bg),
        ))
        .centered(),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}
