use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::{self, Backend, BackendError, QueryState};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, ConfigError};
use crate::model::config::AppConfig;
use crate::model::task::{Task, TaskId};
use crate::ops::auth_flow::is_plausible_email;
use crate::ops::controller::TaskListController;
use crate::ops::task_ops::TaskError;
use crate::session::{Session, SessionError};

/// File in the config directory the signed-in user is kept in
pub const SESSION_FILE: &str = "session.json";

/// How long a command waits for the first snapshot of the task list
const QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a command waits for its writes to leave the process
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for CLI commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("not signed in (run `s1 login <email>`, then `s1 verify <email> <code>`)")]
    NotSignedIn,
    #[error("not a valid email address: {0}")]
    InvalidEmail(String),
    #[error("task id '{0}' is ambiguous or unknown")]
    NoSuchTask(String),
    #[error("could not load tasks: {0}")]
    Query(String),
    #[error("timed out waiting for the task list")]
    Timeout,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything a command (or the TUI) needs, built once at start-up
pub struct Context {
    pub config: AppConfig,
    pub config_dir: PathBuf,
    pub backend: Arc<dyn Backend>,
    pub session: Session,
}

impl Context {
    /// Load config, open the configured backend and restore the session.
    pub fn load(config_path: Option<&Path>) -> Result<Self, CliError> {
        let (config, config_dir) = config_io::load_config(config_path)?;
        let backend = backend::open(&config, &config_dir)?;
        let session = Session::start(
            Arc::clone(&backend),
            &config.backend.app_id,
            Some(config_dir.join(SESSION_FILE)),
        );
        Ok(Context {
            config,
            config_dir,
            backend,
            session,
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(ctx: &mut Context, cmd: Commands, json: bool) -> Result<(), CliError> {
    match cmd {
        // Account commands
        Commands::Login(args) => cmd_login(ctx, args),
        Commands::Verify(args) => cmd_verify(ctx, args, json),
        Commands::Logout => cmd_logout(ctx),
        Commands::Whoami => cmd_whoami(ctx, json),

        // Read commands
        Commands::List => cmd_list(ctx, json),

        // Write commands
        Commands::Add(args) => cmd_add(ctx, args, json),
        Commands::Toggle(args) => cmd_toggle(ctx, args),
        Commands::Rename(args) => cmd_rename(ctx, args),
        Commands::Delete(args) => cmd_delete(ctx, args),
        Commands::Mv(args) => cmd_mv(ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Account commands
// ---------------------------------------------------------------------------

fn cmd_login(ctx: &mut Context, args: LoginArgs) -> Result<(), CliError> {
    let email = args.email.trim();
    if !is_plausible_email(email) {
        return Err(CliError::InvalidEmail(email.to_string()));
    }
    ctx.backend.send_code(email)?;
    println!("code sent to {}", email);
    println!("run `s1 verify {} <code>` to finish signing in", email);
    Ok(())
}

fn cmd_verify(ctx: &mut Context, args: VerifyArgs, json: bool) -> Result<(), CliError> {
    let email = args.email.trim();
    if !is_plausible_email(email) {
        return Err(CliError::InvalidEmail(email.to_string()));
    }
    let user = ctx.backend.verify_code(email, args.code.trim())?;
    ctx.session.sign_in(user.clone())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user_to_json(&user))?);
    } else {
        println!("signed in as {}", user.email);
    }
    Ok(())
}

fn cmd_logout(ctx: &mut Context) -> Result<(), CliError> {
    let email = ctx.session.user().map(|u| u.email.clone());
    ctx.session.sign_out()?;
    match email {
        Some(email) => println!("signed out {}", email),
        None => println!("not signed in"),
    }
    Ok(())
}

fn cmd_whoami(ctx: &mut Context, json: bool) -> Result<(), CliError> {
    let user = ctx.session.user().ok_or(CliError::NotSignedIn)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user_to_json(user))?);
    } else {
        println!("{}", user.email);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &mut Context, json: bool) -> Result<(), CliError> {
    let controller = open_list(ctx)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&list_to_json(controller.list()))?
        );
    } else {
        println!("{}", format_list(controller.list()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: AddArgs, json: bool) -> Result<(), CliError> {
    let mut controller = open_list(ctx)?;
    let id = controller
        .add_title(&args.title)?
        .ok_or(TaskError::EmptyTitle)?;
    ctx.backend.flush(FLUSH_TIMEOUT)?;
    if json {
        println!("{}", serde_json::json!({ "id": id.as_str() }));
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_toggle(ctx: &mut Context, args: IdArgs) -> Result<(), CliError> {
    let mut controller = open_list(ctx)?;
    let task = resolve(&controller, &args.id)?;
    let completed = !task.completed;
    controller.toggle(&task.id, Instant::now())?;
    ctx.backend.flush(FLUSH_TIMEOUT)?;
    let verb = if completed { "done" } else { "reopened" };
    println!("{}: {}", verb, task.title);
    Ok(())
}

fn cmd_rename(ctx: &mut Context, args: RenameArgs) -> Result<(), CliError> {
    let mut controller = open_list(ctx)?;
    let task = resolve(&controller, &args.id)?;
    controller.start_edit(&task.id);
    if let Some(input) = controller.editing_input_mut() {
        input.set(&args.title);
    }
    if !controller.save_edit()? {
        return Err(TaskError::EmptyTitle.into());
    }
    ctx.backend.flush(FLUSH_TIMEOUT)?;
    println!("renamed {}: {}", short_id(&task), args.title.trim());
    Ok(())
}

fn cmd_delete(ctx: &mut Context, args: DeleteArgs) -> Result<(), CliError> {
    let mut controller = open_list(ctx)?;
    let task = resolve(&controller, &args.id)?;

    if !args.yes {
        println!("delete {}", format_task_line(&task));
        eprint!("Proceed? [y/n] ");
        std::io::stderr().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("cancelled");
            return Ok(());
        }
    }

    controller.request_delete(&task.id);
    controller.confirm_delete()?;
    ctx.backend.flush(FLUSH_TIMEOUT)?;
    println!("deleted: {}", task.title);
    Ok(())
}

fn cmd_mv(ctx: &mut Context, args: MvArgs) -> Result<(), CliError> {
    let mut controller = open_list(ctx)?;
    let source = resolve(&controller, &args.id)?;
    let target = resolve(&controller, &args.to)?;
    if controller.reorder(&source.id, Some(&target.id))? {
        ctx.backend.flush(FLUSH_TIMEOUT)?;
        println!("moved {} to position {}", source.title, position(&controller, &target.id));
    } else {
        println!("nothing to move");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Subscribe to the signed-in user's tasks and wait for the first real
/// snapshot.
fn open_list(ctx: &Context) -> Result<TaskListController, CliError> {
    let user = ctx.session.user().cloned().ok_or(CliError::NotSignedIn)?;
    let subscription = ctx.backend.subscribe(&user)?;
    let mut controller = TaskListController::new(Arc::clone(&ctx.backend), user, Duration::ZERO);

    let deadline = Instant::now() + QUERY_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match subscription.recv_timeout(remaining) {
            Some(QueryState::Loading) => continue,
            Some(QueryState::Error(message)) => return Err(CliError::Query(message)),
            Some(state) => {
                controller.apply_query(state);
                return Ok(controller);
            }
            None => return Err(CliError::Timeout),
        }
    }
}

fn resolve(controller: &TaskListController, needle: &str) -> Result<Task, CliError> {
    controller
        .list()
        .resolve(needle.trim())
        .cloned()
        .ok_or_else(|| CliError::NoSuchTask(needle.to_string()))
}

/// 1-based display position
fn position(controller: &TaskListController, id: &TaskId) -> usize {
    controller.list().position(id).map_or(0, |i| i + 1)
}
