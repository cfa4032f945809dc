use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::util::TextInput;

/// Apply a line-editing key to `input`. Returns false for keys that are
/// not line editing (Enter, Esc, arrows up/down and so on).
pub(super) fn apply_text_key(input: &mut TextInput, key: KeyEvent) -> bool {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('w')) | (KeyModifiers::ALT, KeyCode::Backspace) => {
            input.delete_word()
        }
        (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => input.home(),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => input.end(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => input.clear(),
        (_, KeyCode::Backspace) => input.backspace(),
        (_, KeyCode::Delete) => input.delete(),
        (_, KeyCode::Left) => input.move_left(),
        (_, KeyCode::Right) => input.move_right(),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => input.insert_char(c),
        _ => return false,
    }
    true
}

/// Inline rename of the task in the edit slot
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(controller) = app.controller_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => {
            let result = controller.save_edit();
            app.report("rename", result);
        }
        KeyCode::Esc => controller.escape(),
        _ => {
            if let Some(input) = controller.editing_input_mut() {
                apply_text_key(input, key);
            }
        }
    }
}

/// The add dialog
pub(super) fn handle_add(app: &mut App, key: KeyEvent) {
    let Some(controller) = app.controller_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => {
            match controller.add() {
                Ok(Some(id)) => app.focus = Some(id),
                Ok(None) => {}
                Err(e) => app.report("add", Err(e)),
            }
        }
        KeyCode::Esc => controller.escape(),
        _ => {
            apply_text_key(&mut controller.add_input, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;

    #[test]
    fn add_dialog_adds_task_at_end() {
        let (_backend, mut app) = tasks_app(&["First"]);
        handle_key(&mut app, ch('n'));
        assert_eq!(app.mode(), Mode::Add);
        type_str(&mut app, "Buy milk");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode(), Mode::Navigate);
        app.sync(std::time::Instant::now());
        assert_eq!(titles(&app), vec!["First", "Buy milk"]);
        // The cursor lands on the new task
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn blank_add_keeps_dialog_open() {
        let (_backend, mut app) = tasks_app(&[]);
        handle_key(&mut app, ch('n'));
        type_str(&mut app, "   ");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode(), Mode::Add);
    }

    #[test]
    fn esc_closes_add_dialog_and_clears() {
        let (_backend, mut app) = tasks_app(&[]);
        handle_key(&mut app, ch('n'));
        type_str(&mut app, "draft");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode(), Mode::Navigate);
        assert_eq!(app.controller().unwrap().add_input.text(), "");
    }

    #[test]
    fn n_inside_dialog_is_typed() {
        let (_backend, mut app) = tasks_app(&[]);
        handle_key(&mut app, ch('n'));
        handle_key(&mut app, ch('n'));
        assert_eq!(app.controller().unwrap().add_input.text(), "n");
    }

    #[test]
    fn rename_inline() {
        let (_backend, mut app) = tasks_app(&["Old title"]);
        handle_key(&mut app, ch('e'));
        assert_eq!(app.mode(), Mode::Edit);
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        type_str(&mut app, "New title");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode(), Mode::Navigate);
        app.sync(std::time::Instant::now());
        assert_eq!(titles(&app), vec!["New title"]);
    }

    #[test]
    fn blank_rename_stays_in_edit() {
        let (_backend, mut app) = tasks_app(&["Keep"]);
        handle_key(&mut app, ch('e'));
        for _ in 0..4 {
            handle_key(&mut app, key(KeyCode::Backspace));
        }
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode(), Mode::Edit);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode(), Mode::Navigate);
        app.sync(std::time::Instant::now());
        assert_eq!(titles(&app), vec!["Keep"]);
    }
}
