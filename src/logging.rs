use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "COACH_LOG";
const DEFAULT_LEVEL: &str = "info";

fn env_filter() -> EnvFilter {
    // Fall back to the default level if the variable is unset or invalid
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Log to stderr (server and one-shot commands).
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to a file so the TUI owns the terminal. Keep the guard alive until exit.
pub fn init_file() -> Result<(WorkerGuard, PathBuf)> {
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("research-coach")
        .join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, "coach.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Ok((guard, log_dir.join("coach.log")))
}
