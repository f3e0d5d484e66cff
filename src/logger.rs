//! Minimal stderr backend for the `log` facade.

use std::io::Write;
use std::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable that overrides the level chosen on the command line
pub const LOG_ENV: &str = "VMSIM_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "[{:>5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Level for a given number of `-v` flags; `debug` turns on everything
pub fn level_for(verbose: u8, debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::Trace;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the logger. `VMSIM_LOG` wins over `level` when it parses.
pub fn init(level: LevelFilter) {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| LevelFilter::from_str(&v).ok())
        .unwrap_or(level);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
