use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log level
pub const LOG_ENV: &str = "JPLAN_LOG";

pub const LOG_FILE_NAME: &str = "jplan.log";

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Appended to a file, so the TUI screen stays clean
    File(PathBuf),
}

/// `JPLAN_LOG` if set and valid, else `level` from the config, else "warn"
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Default log file inside `data_dir`
pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

/// Install the global subscriber
///
/// Only the first call installs anything; later calls are ignored. When the log
/// file cannot be opened, log lines are dropped so they never reach the TUI screen.
pub fn init(level: &str, target: LogTarget) {
    let filter = build_filter(level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match target {
        LogTarget::Stderr => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
                }
                Err(_) => {
                    let _ = builder.with_writer(std::io::sink).try_init();
                }
            }
        }
    }
}
