//! File logging setup.
//!
//! Each command builds its logger once at start-up and holds the returned
//! [`LogGuard`] until it exits; dropping the guard flushes the logger.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::domain::error::EtfBalanceError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flushes the global logger when dropped.
pub struct LogGuard {
    _private: (),
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        log::logger().flush();
    }
}

/// `2025-09-12 08:30:00 - INFO - message`
pub fn format_line(at: NaiveDateTime, level: log::Level, message: &str) -> String {
    format!("{} - {} - {}", at.format(TIMESTAMP_FORMAT), level, message)
}

/// Append log lines to `path` at `level`.
///
/// Fails if the file cannot be opened. Installing a second logger in the same
/// process is ignored.
pub fn init_file_logger(
    path: &Path,
    level: log::LevelFilter,
) -> Result<LogGuard, EtfBalanceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            let line = format_line(
                Local::now().naive_local(),
                record.level(),
                &record.args().to_string(),
            );
            writeln!(buf, "{line}")
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();

    Ok(LogGuard { _private: () })
}
