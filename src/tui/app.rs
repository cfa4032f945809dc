use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::backend::{BackendError, QueryState, Subscription};
use crate::model::UiConfig;
use crate::model::task::TaskId;
use crate::model::user::User;
use crate::ops::auth_flow::{AuthFlow, AuthOutcome};
use crate::ops::controller::TaskListController;
use crate::session::Session;

use super::input;
use super::render;
use super::theme::Theme;

/// Which screen is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Tasks,
}

/// Current interaction mode on the task screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Renaming the task in the edit slot
    Edit,
    /// Add dialog open
    Add,
    /// Delete confirmation showing
    Confirm,
    /// Dragging a task to a new position
    Drag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Keyboard,
    Mouse,
}

/// An in-progress drag. Dropping or cancelling discards it entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub task_id: TaskId,
    pub source: DragSource,
    /// Row the drag started on
    pub origin: usize,
    /// Row currently hovered; the drop target
    pub hover: usize,
    /// Last pointer position (column, row) for mouse drags
    pub pointer: Option<(u16, u16)>,
    /// Mouse drags only start once the pointer has moved a full row
    pub active: bool,
}

/// The signed-in half of the app: controller plus its live query
pub struct Board {
    pub controller: TaskListController,
    subscription: Option<Subscription>,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub auth: AuthFlow,
    pub board: Option<Board>,
    pub should_quit: bool,
    pub theme: Theme,
    /// Cursor index into the task list
    pub cursor: usize,
    /// Scroll offset (first visible row)
    pub scroll_offset: usize,
    pub drag: Option<DragState>,
    /// Task the cursor lands on once a snapshot containing it arrives
    pub focus: Option<TaskId>,
    /// Transient message for the footer
    pub status: Option<String>,
    pub celebration: Duration,
    pub mouse: bool,
    /// Where task rows were last drawn, for mouse hit testing
    pub list_area: Rect,
    /// Where the sign-out button was last drawn
    pub sign_out_area: Rect,
}

impl App {
    pub fn new(session: Session, ui: &UiConfig) -> Self {
        let mut app = App {
            session,
            auth: AuthFlow::new(),
            board: None,
            should_quit: false,
            theme: Theme::from_config(ui),
            cursor: 0,
            scroll_offset: 0,
            drag: None,
            focus: None,
            status: None,
            celebration: Duration::from_millis(ui.celebration_ms),
            mouse: ui.mouse,
            list_area: Rect::default(),
            sign_out_area: Rect::default(),
        };
        if let Some(user) = app.session.user().cloned() {
            app.open_board(user);
        }
        app
    }

    pub fn screen(&self) -> Screen {
        if self.board.is_some() {
            Screen::Tasks
        } else {
            Screen::Login
        }
    }

    pub fn mode(&self) -> Mode {
        if self.drag.is_some() {
            return Mode::Drag;
        }
        let Some(controller) = self.controller() else {
            return Mode::Navigate;
        };
        if controller.is_add_open() {
            Mode::Add
        } else if controller.pending_delete_task().is_some() {
            Mode::Confirm
        } else if controller.editing().is_some() {
            Mode::Edit
        } else {
            Mode::Navigate
        }
    }

    pub fn controller(&self) -> Option<&TaskListController> {
        self.board.as_ref().map(|b| &b.controller)
    }

    pub fn controller_mut(&mut self) -> Option<&mut TaskListController> {
        self.board.as_mut().map(|b| &mut b.controller)
    }

    fn open_board(&mut self, user: User) {
        let backend = self.session.backend();
        let mut controller = TaskListController::new(backend.clone(), user.clone(), self.celebration);
        let subscription = match backend.subscribe(&user) {
            Ok(sub) => Some(sub),
            Err(e) if e.is_auth_rejection() => {
                tracing::warn!(user = %user.id, error = %e, "stored session rejected");
                self.sign_out();
                self.status = Some("Session expired, please sign in again".into());
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "subscribe failed");
                controller.apply_query(QueryState::Error(e.to_string()));
                None
            }
        };
        self.board = Some(Board {
            controller,
            subscription,
        });
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// Take in pending snapshots and expire timers. Called once per frame.
    pub fn sync(&mut self, now: Instant) {
        let state = self
            .board
            .as_ref()
            .and_then(|b| b.subscription.as_ref())
            .and_then(Subscription::poll);
        if let Some(state) = state {
            let selected = self.cursor_task_id();
            if let Some(controller) = self.controller_mut() {
                controller.apply_query(state);
            }
            self.place_cursor(selected);
        }
        if let Some(controller) = self.controller_mut() {
            controller.tick(now);
        }
    }

    /// Keep the cursor on the same task across a snapshot, or move it to
    /// the focused task once that shows up.
    fn place_cursor(&mut self, selected: Option<TaskId>) {
        let Some(controller) = self.controller() else {
            return;
        };
        let list = controller.list();
        let focused = self.focus.as_ref().and_then(|id| list.position(id));
        let position = focused.or_else(|| selected.and_then(|id| list.position(&id)));
        let drag_gone = self
            .drag
            .as_ref()
            .is_some_and(|drag| list.get(&drag.task_id).is_none());
        let len = list.len();

        if focused.is_some() {
            self.focus = None;
        }
        if drag_gone {
            self.drag = None;
        }
        self.cursor = position.unwrap_or(self.cursor).min(len.saturating_sub(1));
    }

    /// Id of the task under the cursor
    pub fn cursor_task_id(&self) -> Option<TaskId> {
        let controller = self.controller()?;
        controller
            .list()
            .tasks()
            .get(self.cursor)
            .map(|t| t.id.clone())
    }

    /// Clamp the cursor to the list
    pub fn clamp_cursor(&mut self) {
        let len = self.controller().map_or(0, |c| c.list().len());
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Run the auth request the login form queued. Blocks on the backend.
    pub fn finish_auth(&mut self) {
        let backend = self.session.backend();
        if let AuthOutcome::SignedIn(user) = self.auth.finish_submit(backend.as_ref()) {
            self.sign_in(user);
        }
    }

    pub fn sign_in(&mut self, user: User) {
        if let Err(e) = self.session.sign_in(user.clone()) {
            tracing::warn!(error = %e, "could not persist session");
            self.status = Some(e.to_string());
        }
        self.auth = AuthFlow::new();
        self.open_board(user);
    }

    pub fn sign_out(&mut self) {
        // Dropping the board stops its subscription.
        self.board = None;
        self.drag = None;
        self.cursor = 0;
        self.scroll_offset = 0;
        if let Err(e) = self.session.sign_out() {
            tracing::warn!(error = %e, "sign out failed");
        }
        self.auth = AuthFlow::new();
    }

    /// Mutation failures are logged, never shown.
    pub fn report(&self, op: &str, result: Result<bool, BackendError>) {
        if let Err(e) = result {
            tracing::warn!(op, error = %e, "mutation failed");
        }
    }

    /// Task row under a terminal position, if any
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let index = (row - area.y) as usize + self.scroll_offset;
        let len = self.controller()?.list().len();
        (index < len).then_some(index)
    }
}

/// Run the TUI application
pub fn run(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if app.mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.sync(Instant::now());
        terminal.draw(|frame| render::render(frame, app))?;

        // The busy label is on screen now; run the request.
        if app.auth.is_busy() {
            app.finish_auth();
            continue;
        }

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
