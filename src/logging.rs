//! File-based logging.
//!
//! Logs are written to `<state dir>/rtmp-setup/debug.log` using a daily
//! rolling file appender. Stderr output is enabled when `RUST_LOG` is set.
//! Stdout is never used for logs; it carries the operator console.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory under the platform state dir that holds the log files.
const LOG_DIR_NAME: &str = "rtmp-setup";

/// Base name of the rolling log file; the appender adds a date suffix.
const LOG_FILE_NAME: &str = "debug.log";

/// Initialise the tracing subscriber with file + optional stderr layers.
///
/// `default_level` applies when `RUST_LOG` is unset or invalid. The returned
/// [`WorkerGuard`] must be held for the lifetime of the program; dropping it
/// flushes and closes the log file writer.
pub fn init_logging(default_level: &str) -> WorkerGuard {
    let log_dir = log_directory();

    // Logging still initialises if this fails; the appender reports its own errors.
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!(
            "warning: could not create log directory {}: {e}",
            log_dir.display()
        );
    }

    // One file per day, written off the main thread.
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File layer: always on, plain text for grepping.
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    // Stderr layer: only when RUST_LOG is set, for debugging a run live.
    // Stdout stays clean for prompts and the summary table.
    let stderr_layer = std::env::var("RUST_LOG").is_ok().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
    });

    // RUST_LOG wins, then --log-level, then info if both fail to parse.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    guard
}

/// `dirs::state_dir()/rtmp-setup`, falling back to `~/.local/state` and
/// finally the working directory.
fn log_directory() -> PathBuf {
    if let Some(state) = dirs::state_dir() {
        return state.join(LOG_DIR_NAME);
    }
    // Platforms without a state dir (macOS, Windows) still get an XDG-style path.
    if let Some(home) = dirs::home_dir() {
        return home.join(".local").join("state").join(LOG_DIR_NAME);
    }
    // No home directory at all: log next to the working directory.
    PathBuf::from(".")
}
