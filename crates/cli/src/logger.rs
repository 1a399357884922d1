use std::io::Write;

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

#[derive(Debug, PartialEq)]
pub struct Entry {
    pub time: String,
    pub level: Level,
    pub message: String,
}

impl Entry {
    fn from_record(record: &Record) -> Self {
        Self {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level: record.level(),
            message: record.args().to_string(),
        }
    }

    fn format(&self) -> String {
        format!("{} {:<5} {}", self.time, self.level, self.message)
    }
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = Entry::from_record(record);
            let _ = writeln!(std::io::stderr().lock(), "{}", entry.format());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
