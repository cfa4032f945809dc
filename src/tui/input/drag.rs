use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::tui::app::{App, DragSource, DragState, Mode};

/// Pick up the task under the cursor.
pub(super) fn begin_keyboard_drag(app: &mut App) {
    let Some(task_id) = app.cursor_task_id() else {
        return;
    };
    app.drag = Some(DragState {
        task_id,
        source: DragSource::Keyboard,
        origin: app.cursor,
        hover: app.cursor,
        pointer: None,
        active: true,
    });
}

pub(super) fn handle_drag(app: &mut App, key: KeyEvent) {
    let len = app.controller().map_or(0, |c| c.list().len());
    let Some(drag) = &mut app.drag else {
        return;
    };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            drag.hover = (drag.hover + 1).min(len.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => drag.hover = drag.hover.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => drag.hover = 0,
        KeyCode::Char('G') | KeyCode::End => drag.hover = len.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('m') | KeyCode::Char(' ') => drop_drag(app),
        KeyCode::Esc => app.drag = None,
        _ => {}
    }
}

/// Drop the dragged task on the hovered row and clear all drag state.
fn drop_drag(app: &mut App) {
    let Some(drag) = app.drag.take() else {
        return;
    };
    let Some(controller) = app.controller_mut() else {
        return;
    };
    let target = controller
        .list()
        .tasks()
        .get(drag.hover)
        .map(|t| t.id.clone());
    let result = controller.reorder(&drag.task_id, target.as_ref());
    app.report("reorder", result);
    app.focus = Some(drag.task_id);
}

pub(super) fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => mouse_down(app, mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => mouse_drag(app, mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => mouse_up(app),
        MouseEventKind::ScrollDown if app.mode() == Mode::Navigate => {
            app.cursor = app.cursor.saturating_add(1);
            app.clamp_cursor();
        }
        MouseEventKind::ScrollUp if app.mode() == Mode::Navigate => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        _ => {}
    }
}

fn mouse_down(app: &mut App, column: u16, row: u16) {
    if app.mode() != Mode::Navigate {
        return;
    }
    // The header is drawn on loading and error screens too.
    let sign_out = app.sign_out_area;
    if sign_out.width > 0
        && (sign_out.x..sign_out.x + sign_out.width).contains(&column)
        && row == sign_out.y
    {
        app.sign_out();
        return;
    }
    if !app.controller().is_some_and(|c| c.is_ready()) {
        return;
    }
    let Some(index) = app.row_at(column, row) else {
        return;
    };
    app.cursor = index;
    let Some(task_id) = app.cursor_task_id() else {
        return;
    };
    app.drag = Some(DragState {
        task_id,
        source: DragSource::Mouse,
        origin: index,
        hover: index,
        pointer: Some((column, row)),
        active: false,
    });
}

fn mouse_drag(app: &mut App, column: u16, row: u16) {
    let hovered = app.row_at(column, row);
    let Some(drag) = &mut app.drag else {
        return;
    };
    if drag.source != DragSource::Mouse {
        return;
    }
    drag.pointer = Some((column, row));
    if let Some(index) = hovered {
        // A drag begins once the pointer reaches another row.
        if index != drag.origin {
            drag.active = true;
        }
        drag.hover = index;
    }
}

fn mouse_up(app: &mut App) {
    let Some(drag) = &app.drag else {
        return;
    };
    if drag.source != DragSource::Mouse {
        return;
    }
    if drag.active {
        drop_drag(app);
    } else {
        app.drag = None;
    }
}
