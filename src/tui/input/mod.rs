mod confirm;
mod drag;
mod edit;
mod login;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use super::app::{App, Mode, Screen};

use confirm::handle_confirm;
use drag::{handle_drag, handle_mouse_event};
use edit::{handle_add, handle_edit};
use login::handle_login;
use navigate::handle_navigate;

/// Handle a key event in the current screen and mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    app.status = None;

    let key = normalize_key(key);
    match app.screen() {
        Screen::Login => handle_login(app, key),
        Screen::Tasks => match app.mode() {
            Mode::Navigate => handle_navigate(app, key),
            Mode::Edit => handle_edit(app, key),
            Mode::Add => handle_add(app, key),
            Mode::Confirm => handle_confirm(app, key),
            Mode::Drag => handle_drag(app, key),
        },
    }
}

/// Handle a mouse event. Only the task screen reacts to the mouse.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen() != Screen::Tasks {
        return;
    }
    handle_mouse_event(app, mouse);
}

/// Handle a bracketed paste: inserted into whichever text field has
/// focus, with line breaks flattened.
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    let clean = text.replace(['\n', '\r'], " ");
    match app.screen() {
        Screen::Login => {
            if !app.auth.is_busy() && app.auth.error.is_none() {
                app.auth.active_input().insert_str(clean.trim());
            }
        }
        Screen::Tasks => {
            let mode = app.mode();
            let Some(controller) = app.controller_mut() else {
                return;
            };
            match mode {
                Mode::Add => controller.add_input.insert_str(&clean),
                Mode::Edit => {
                    if let Some(input) = controller.editing_input_mut() {
                        input.insert_str(&clean);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Shift+letter arrives as either `Char('S')` or `Char('s')` with SHIFT
/// depending on the terminal; fold both to the uppercase form.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}
