use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "s1", about = concat!("[x] sprintone v", env!("CARGO_PKG_VERSION"), " - one list, synced"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Email a sign-in code
    Login(LoginArgs),
    /// Exchange an emailed code for a session
    Verify(VerifyArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// List tasks in display order
    List,
    /// Add a task at the bottom of the list
    Add(AddArgs),
    /// Flip a task between done and not done
    Toggle(IdArgs),
    /// Change a task's title
    Rename(RenameArgs),
    /// Permanently delete a task
    Delete(DeleteArgs),
    /// Move a task onto another task's position
    Mv(MvArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    /// Address to send the code to
    pub email: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Address the code was sent to
    pub email: String,
    /// The code from the email
    pub code: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID (or a unique prefix of one)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Task ID (or a unique prefix of one)
    pub id: String,
    /// New title
    pub title: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ID (or a unique prefix of one)
    pub id: String,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to move
    pub id: String,
    /// Task whose position it takes
    #[arg(long)]
    pub to: String,
}
