//! Terminal logger for the `log` facade.
//!
//! Writes `LEVEL message` lines to stderr with the level label colored, so the instruction
//! trace (`trace!`) and fault reports (`error!`) read the same way as the rest of the output.

use std::io::Write;

use ansi_term::Colour::{Blue, Green, Red, Yellow};
use ansi_term::Style;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct TermLogger {
    level: LevelFilter,
}

impl TermLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    fn label(level: Level) -> String {
        let name = format!("{:<5}", level);
        match level {
            Level::Error => Red.bold().paint(name).to_string(),
            Level::Warn => Yellow.bold().paint(name).to_string(),
            Level::Info => Green.bold().paint(name).to_string(),
            Level::Debug => Blue.paint(name).to_string(),
            Level::Trace => Style::new().dimmed().paint(name).to_string(),
        }
    }
}

impl Log for TermLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        // A closed stderr has nowhere to report to.
        let _ = writeln!(err, "{} {}", Self::label(record.level()), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install a [`TermLogger`] as the global logger. Fails if a logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(TermLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_level() {
        let logger = TermLogger::new(LevelFilter::Info);
        let warn = Metadata::builder().level(Level::Warn).build();
        let trace = Metadata::builder().level(Level::Trace).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&trace));
    }

    #[test]
    fn labels_are_padded_level_names() {
        let label = TermLogger::label(Level::Info);
        assert!(label.contains("INFO "));
        assert!(TermLogger::label(Level::Error).contains("ERROR"));
    }
}
