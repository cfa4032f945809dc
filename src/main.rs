use clap::Parser;
use sprintone::cli::commands::Cli;
use sprintone::cli::handlers::{self, Context, FLUSH_TIMEOUT};
use sprintone::io::{config_io, logging};
use sprintone::tui::{self, App};

fn main() {
    let cli = Cli::parse();

    // Logging is best effort; a read-only home must not stop the app.
    let _ = logging::init_logging(&config_io::config_dir());

    let mut ctx = match Context::load(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        None => {
            // No subcommand → launch TUI
            let backend = ctx.backend.clone();
            let mut app = App::new(ctx.session, &ctx.config.ui);
            let result = tui::run(&mut app);
            if let Err(e) = backend.flush(FLUSH_TIMEOUT) {
                tracing::warn!(error = %e, "unsent writes on exit");
            }
            if let Err(e) = result {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(cmd) => {
            if let Err(e) = handlers::dispatch(&mut ctx, cmd, cli.json) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
