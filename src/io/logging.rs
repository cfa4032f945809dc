use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Default filter when RUST_LOG is unset
const DEFAULT_FILTER: &str = "sprintone=info";

/// Route tracing output to `<dir>/sprintone.log`. The TUI owns the
/// terminal, so nothing is ever written to stdout or stderr.
pub fn init_logging(dir: &Path) -> Result<(), std::io::Error> {
    fs::create_dir_all(dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("sprintone.log"))?;

    // A second init (tests, repeated runs in-process) is not an error.
    let _ = Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .try_init();
    Ok(())
}
