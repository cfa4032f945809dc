use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    let Some(controller) = app.controller_mut() else {
        return;
    };
    match (key.modifiers, key.code) {
        // Confirm: y or Enter
        (KeyModifiers::NONE, KeyCode::Char('y')) | (_, KeyCode::Enter) => {
            let result = controller.confirm_delete();
            app.report("delete", result);
            app.clamp_cursor();
        }
        // Cancel: n or Esc
        (KeyModifiers::NONE, KeyCode::Char('n')) => controller.cancel_delete(),
        (_, KeyCode::Esc) => controller.escape(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use crate::backend::QueryState;
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;

    #[test]
    fn enter_confirms() {
        let (backend, mut app) = tasks_app(&["A"]);
        handle_key(&mut app, ch('d'));
        handle_key(&mut app, key(KeyCode::Enter));
        let owner = app.controller().unwrap().user().id.clone();
        assert!(backend.tasks_for(&owner).unwrap().is_empty());
    }

    #[test]
    fn esc_cancels() {
        let (backend, mut app) = tasks_app(&["A"]);
        handle_key(&mut app, ch('d'));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode(), Mode::Navigate);
        let owner = app.controller().unwrap().user().id.clone();
        assert_eq!(backend.tasks_for(&owner).unwrap().len(), 1);
    }

    #[test]
    fn vanished_task_hides_confirmation() {
        let (_backend, mut app) = tasks_app(&["A"]);
        handle_key(&mut app, ch('d'));
        assert_eq!(app.mode(), Mode::Confirm);
        app.controller_mut()
            .unwrap()
            .apply_query(QueryState::Ready(Vec::new()));
        assert_eq!(app.mode(), Mode::Navigate);
    }
}
