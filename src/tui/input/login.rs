use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::auth_flow::AuthStep;
use crate::tui::app::App;

use super::edit::apply_text_key;

pub(super) fn handle_login(app: &mut App, key: KeyEvent) {
    // Requests in flight ignore input.
    if app.auth.is_busy() {
        return;
    }

    // An error alert swallows the next key.
    if app.auth.error.is_some() {
        app.auth.dismiss_error();
        return;
    }

    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => {
            // Runs after the next draw so the busy label shows first.
            app.auth.begin_submit();
        }
        (_, KeyCode::Esc) => match app.auth.step {
            AuthStep::CodeVerification { .. } => app.auth.back(),
            AuthStep::EmailEntry => app.should_quit = true,
        },
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => app.should_quit = true,
        _ => {
            apply_text_key(app.auth.active_input(), key);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use crate::ops::auth_flow::AuthStep;
    use crate::tui::app::Screen;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;

    #[test]
    fn email_then_code_signs_in() {
        let (_backend, mut app) = login_app();
        type_str(&mut app, "me@example.com");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.auth.is_busy());
        // Typing while busy is ignored
        type_str(&mut app, "zzz");
        app.finish_auth();
        assert_eq!(
            app.auth.step,
            AuthStep::CodeVerification {
                email: "me@example.com".into()
            }
        );

        type_str(&mut app, "12345678");
        // Capped at six characters
        assert_eq!(app.auth.code.text(), "123456");
        handle_key(&mut app, key(KeyCode::Enter));
        app.finish_auth();
        assert_eq!(app.screen(), Screen::Tasks);
        assert_eq!(
            app.session.user().map(|u| u.email.as_str()),
            Some("me@example.com")
        );
    }

    #[test]
    fn implausible_email_does_nothing() {
        let (_backend, mut app) = login_app();
        type_str(&mut app, "not-an-email");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(!app.auth.is_busy());
        assert!(app.auth.error.is_none());
        assert_eq!(app.auth.step, AuthStep::EmailEntry);
    }

    #[test]
    fn wrong_code_shows_alert_then_dismisses() {
        let (_backend, mut app) = login_app();
        type_str(&mut app, "me@example.com");
        handle_key(&mut app, key(KeyCode::Enter));
        app.finish_auth();
        type_str(&mut app, "000000");
        handle_key(&mut app, key(KeyCode::Enter));
        app.finish_auth();

        assert_eq!(app.screen(), Screen::Login);
        assert_eq!(
            app.auth.error.as_deref(),
            Some("ERROR: Invalid or expired verification code")
        );
        assert_eq!(app.auth.code.text(), "");

        // The key that dismisses the alert is not typed into the form
        handle_key(&mut app, ch('9'));
        assert!(app.auth.error.is_none());
        assert_eq!(app.auth.code.text(), "");
    }

    #[test]
    fn esc_goes_back_from_code_entry() {
        let (_backend, mut app) = login_app();
        type_str(&mut app, "me@example.com");
        handle_key(&mut app, key(KeyCode::Enter));
        app.finish_auth();
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.auth.step, AuthStep::EmailEntry);
        assert_eq!(app.auth.email.text(), "");
        assert!(!app.should_quit);

        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn paste_fills_active_field() {
        let (_backend, mut app) = login_app();
        crate::tui::input::handle_paste(&mut app, " me@example.com\n");
        assert_eq!(app.auth.email.text(), "me@example.com");
    }
}
