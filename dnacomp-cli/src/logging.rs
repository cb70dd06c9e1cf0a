use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::PROGRESS_BAR;

/// Writes log lines to stderr without tearing the progress bar.
struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{} {:<5} {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", msg);
        } else {
            PROGRESS_BAR.println(msg);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}
