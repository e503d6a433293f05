//! Stderr backend for the `log` facade.
//!
//! Lines look like `[WARN] - 2026-01-31 12:00:00 - sheet_table::table: Row 1 not in range`.

use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

/// Environment variable that overrides the verbosity picked on the command line.
pub const LOG_ENV_VAR: &str = "SHEET_TABLE_LOG";

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!(
            "[{}] - {} - {}: {}\n",
            record.level(),
            timestamp,
            record.target(),
            record.args()
        );

        // Nowhere left to report a failed write to stderr
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Map `-v` repetitions to a level: warn, info, debug, then trace.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Resolve the level from `SHEET_TABLE_LOG` if it holds a valid level name, else `fallback`.
pub fn resolve_level(env_value: Option<&str>, fallback: LevelFilter) -> LevelFilter {
    env_value
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(fallback)
}

/// Install the stderr logger. Later calls are ignored.
pub fn init(verbosity: u8) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(env_value.as_deref(), level_for_verbosity(verbosity));

    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
