use std::time::Instant;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole app as of `now`.
pub fn render_app(app: &mut App, now: Instant) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _| {
        super::render_at(frame, app, now);
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::tui::input::test_support::{login_app, tasks_app};

    #[test]
    fn full_login_screen() {
        let (_backend, mut app) = login_app();
        let out = render_app(&mut app, Instant::now());
        assert!(out.contains("SPRINTONE TODO"));
        assert!(!out.contains("[N] NEW TASK"));
    }

    #[test]
    fn full_task_screen_with_overlays() {
        let (_backend, mut app) = tasks_app(&["Stretch"]);
        let now = Instant::now();
        let id = app.cursor_task_id().unwrap();
        app.controller_mut().unwrap().toggle(&id, now).unwrap();
        app.sync(now);

        let out = render_app(&mut app, now);
        assert!(out.contains("TASK DONE!"));
        assert!(out.contains("[N] NEW TASK | [ESC] CANCEL | [M] MOVE"));

        // Two seconds later the banner is gone
        let later = now + Duration::from_secs(2);
        app.sync(later);
        let out = render_app(&mut app, later);
        assert!(!out.contains("TASK DONE!"));
        assert!(out.contains("[x] Stretch"));
    }
}
