pub mod add_popup;
pub mod alert_popup;
pub mod celebration;
pub mod delete_confirm;
pub mod drag_overlay;
pub mod helpers;
pub mod login_view;
pub mod status_row;
pub mod task_view;

#[cfg(test)]
pub mod test_helpers;

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Screen};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    render_at(frame, app, Instant::now());
}

/// Render as of `now` (the celebration overlay depends on the clock)
pub fn render_at(frame: &mut Frame, app: &mut App, now: Instant) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    match app.screen() {
        Screen::Login => {
            login_view::render_login_view(frame, app, chunks[0]);
            if app.auth.error.is_some() {
                alert_popup::render_alert_popup(frame, app, area);
            }
        }
        Screen::Tasks => {
            task_view::render_task_view(frame, app, chunks[0]);

            // Overlays, lowest first
            if app.drag.as_ref().is_some_and(|d| d.active) {
                drag_overlay::render_drag_overlay(frame, app);
            }
            if app.controller().is_some_and(|c| c.is_add_open()) {
                add_popup::render_add_popup(frame, app, area);
            }
            if app
                .controller()
                .is_some_and(|c| c.pending_delete_task().is_some())
            {
                delete_confirm::render_delete_confirm(frame, app, area);
            }
            if app.controller().is_some_and(|c| c.is_celebrating(now)) {
                celebration::render_celebration(frame, app, area);
            }
        }
    }

    status_row::render_status_row(frame, app, chunks[1]);
}
