use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::spans_width;
use super::task_view::{GRIP, task_spans};

/// Floating copy of the dragged task, drawn next to the pointer (mouse)
/// or the drop target row (keyboard)
pub fn render_drag_overlay(frame: &mut Frame, app: &App) {
    let Some(drag) = app.drag.as_ref().filter(|d| d.active) else {
        return;
    };
    let Some(task) = app.controller().and_then(|c| c.list().get(&drag.task_id)) else {
        return;
    };
    let list = app.list_area;
    if list.width < 8 || list.height == 0 {
        return;
    }

    let row = match drag.pointer {
        Some((_, y)) => y,
        None => list.y + drag.hover.saturating_sub(app.scroll_offset) as u16,
    };

    let bg = app.theme.drag_bg;
    let max_w = list.width.saturating_sub(4) as usize;
    let mut spans = vec![Span::styled(
        format!("{} ", GRIP),
        Style::default().fg(app.theme.highlight).bg(bg),
    )];
    spans.extend(task_spans(app, task, bg, false, max_w.saturating_sub(4)));
    let content_w = (spans_width(&spans) + 3).min(max_w) as u16;

    // Box is three rows tall, centered on the row, kept inside the list.
    let frame_area = frame.area();
    let height = 3u16;
    let y = row
        .saturating_sub(1)
        .clamp(list.y, (list.y + list.height).saturating_sub(height).max(list.y));
    let x = list.x + 3;
    let overlay_area = Rect::new(x, y, content_w + 2, height).intersection(frame_area);

    frame.render_widget(Clear, overlay_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), overlay_area);
}
