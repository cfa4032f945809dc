use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

use super::drag::begin_keyboard_drag;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Loading and error screens accept nothing but quit and sign out.
    let ready = app.controller().is_some_and(|c| c.is_ready());
    if !ready {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('S') => app.sign_out(),
            _ => {}
        }
        return;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('q')) => app.should_quit = true,

        // Cursor
        (KeyModifiers::NONE, KeyCode::Char('j')) | (_, KeyCode::Down) => {
            app.cursor = app.cursor.saturating_add(1);
            app.clamp_cursor();
        }
        (KeyModifiers::NONE, KeyCode::Char('k')) | (_, KeyCode::Up) => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        (KeyModifiers::NONE, KeyCode::Char('g')) | (_, KeyCode::Home) => app.cursor = 0,
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => {
            app.cursor = usize::MAX;
            app.clamp_cursor();
        }

        // New task
        (KeyModifiers::NONE, KeyCode::Char('n')) => {
            if let Some(controller) = app.controller_mut()
                && controller.can_open_add()
            {
                controller.open_add();
            }
        }

        // Toggle
        (KeyModifiers::NONE, KeyCode::Char('x')) | (_, KeyCode::Enter) => {
            let Some(id) = app.cursor_task_id() else {
                return;
            };
            if let Some(controller) = app.controller_mut() {
                let result = controller.toggle(&id, Instant::now());
                app.report("toggle", result);
            }
        }

        // Rename
        (KeyModifiers::NONE, KeyCode::Char('e')) => {
            if let Some(id) = app.cursor_task_id()
                && let Some(controller) = app.controller_mut()
            {
                controller.start_edit(&id);
            }
        }

        // Delete (asks first)
        (KeyModifiers::NONE, KeyCode::Char('d')) | (_, KeyCode::Delete) => {
            if let Some(id) = app.cursor_task_id()
                && let Some(controller) = app.controller_mut()
            {
                controller.request_delete(&id);
            }
        }

        // Grab for reordering
        (KeyModifiers::NONE, KeyCode::Char('m') | KeyCode::Char(' ')) => begin_keyboard_drag(app),

        (_, KeyCode::Char('S')) => app.sign_out(),

        (_, KeyCode::Esc) => {
            if let Some(controller) = app.controller_mut() {
                controller.escape();
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    use crate::backend::QueryState;
    use crate::model::user::User;
    use crate::tui::app::{Mode, Screen};
    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;

    #[test]
    fn cursor_moves_and_clamps() {
        let (_backend, mut app) = tasks_app(&["A", "B", "C"]);
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('j'));
        assert_eq!(app.cursor, 2);
        handle_key(&mut app, ch('k'));
        assert_eq!(app.cursor, 1);
        handle_key(&mut app, ch('g'));
        assert_eq!(app.cursor, 0);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('g'), KeyModifiers::SHIFT));
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn toggle_celebrates() {
        let (_backend, mut app) = tasks_app(&["A"]);
        handle_key(&mut app, ch('x'));
        app.sync(Instant::now());
        let controller = app.controller().unwrap();
        assert!(controller.list().tasks()[0].completed);
        assert!(controller.is_celebrating(Instant::now()));
        app.sync(Instant::now() + Duration::from_secs(3));
        assert!(!app.controller().unwrap().is_celebrating(Instant::now()));
    }

    #[test]
    fn delete_asks_then_deletes() {
        let (_backend, mut app) = tasks_app(&["A", "B"]);
        handle_key(&mut app, ch('d'));
        assert_eq!(app.mode(), Mode::Confirm);
        handle_key(&mut app, ch('n'));
        assert_eq!(app.mode(), Mode::Navigate);
        app.sync(Instant::now());
        assert_eq!(titles(&app), vec!["A", "B"]);

        handle_key(&mut app, ch('d'));
        handle_key(&mut app, ch('y'));
        app.sync(Instant::now());
        assert_eq!(titles(&app), vec!["B"]);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn n_is_ignored_while_editing() {
        let (_backend, mut app) = tasks_app(&["A"]);
        handle_key(&mut app, ch('e'));
        handle_key(&mut app, ch('n'));
        let controller = app.controller().unwrap();
        assert!(!controller.is_add_open());
        // The key went into the rename buffer instead
        assert_eq!(controller.editing().unwrap().input.text(), "An");
    }

    #[test]
    fn loading_screen_only_quits() {
        let (_backend, mut app) = tasks_app(&["A"]);
        app.controller_mut().unwrap().apply_query(QueryState::Loading);
        handle_key(&mut app, ch('n'));
        assert!(!app.controller().unwrap().is_add_open());
        handle_key(&mut app, ch('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn rejected_session_falls_back_to_login() {
        let (_backend, mut app) = login_app();
        // Never registered with the store, so the query is refused.
        app.sign_in(User {
            id: "stranger".into(),
            email: "gone@example.com".into(),
            refresh_token: Some("stale".into()),
        });
        app.sync(Instant::now());
        assert_eq!(app.screen(), Screen::Login);
        assert!(!app.session.is_signed_in());
        assert!(app.status.as_deref().is_some_and(|s| s.contains("sign in again")));
    }

    #[test]
    fn error_screen_accepts_sign_out_key() {
        let (_backend, mut app) = tasks_app(&["A"]);
        app.controller_mut()
            .unwrap()
            .apply_query(QueryState::Error("permission denied".into()));
        handle_key(&mut app, ch('x'));
        assert_eq!(app.screen(), Screen::Tasks);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::SHIFT));
        assert_eq!(app.screen(), Screen::Login);
        assert!(!app.session.is_signed_in());
    }

    #[test]
    fn sign_out_returns_to_login() {
        let (_backend, mut app) = tasks_app(&["A"]);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::SHIFT));
        assert_eq!(app.screen(), Screen::Login);
        assert!(!app.session.is_signed_in());
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let (_backend, mut app) = tasks_app(&[]);
        handle_key(&mut app, ch('n'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
