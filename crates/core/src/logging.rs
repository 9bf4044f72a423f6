//! Log setup for the `docscope` binary.
//!
//! Events always go to a daily file in [`log_dir`]. With `to_stderr` they are
//! echoed to the terminal as well, which is how `-v` surfaces rows and edges
//! dropped while a site loads.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Overrides the log directory.
pub const LOG_DIR_ENV: &str = "DOCSCOPE_LOG_DIR";

const QUIET_DIRECTIVES: &str = "info";
const VERBOSE_DIRECTIVES: &str = "info,docscope_core=debug,docscope_cli=debug";

pub fn log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".docscope")
        .join("logs")
}

fn directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_DIRECTIVES
    } else {
        QUIET_DIRECTIVES
    }
}

/// `RUST_LOG` when set, otherwise the defaults for the verbosity.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbose)))
}

/// Daily `<component>.<date>.log` files in `dir`. Falls back to discarding
/// output when the directory cannot be used.
fn file_writer(dir: &Path, component: &str) -> (NonBlocking, WorkerGuard) {
    let appender = std::fs::create_dir_all(dir).map_err(|e| e.to_string()).and_then(|_| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(component)
            .filename_suffix("log")
            .build(dir)
            .map_err(|e| e.to_string())
    });
    match appender {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(e) => {
            eprintln!("warning: not writing logs to {}: {}", dir.display(), e);
            tracing_appender::non_blocking(std::io::sink())
        }
    }
}

/// Install the global subscriber. Buffered lines are flushed when the
/// returned guard drops, so hold it until exit.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let dir = log_dir();
    let (writer, guard) = file_writer(&dir, component);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter(to_stderr))
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("logging {} to {}", component, dir.display());
    }

    guard
}
