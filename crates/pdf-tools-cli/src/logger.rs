use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// Logger that echoes to stderr and keeps the most recent entries so the
/// run can end with a summary.
#[derive(Clone)]
pub struct CliLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    /// Every warning or error seen, including ones the ring has dropped
    warning_count: Arc<AtomicUsize>,
    max_entries: usize,
    level: LevelFilter,
}

impl CliLogger {
    pub fn new(max_entries: usize, level: LevelFilter) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            warning_count: Arc::new(AtomicUsize::new(0)),
            max_entries,
            level,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count.load(Ordering::Relaxed)
    }

    /// Warnings still held in the ring
    pub fn warnings(&self) -> Vec<LogEntry> {
        self.entries()
            .iter()
            .filter(|entry| entry.level <= Level::Warn)
            .cloned()
            .collect()
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if record.level() <= Level::Warn {
            self.warning_count.fetch_add(1, Ordering::Relaxed);
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            message: format!("{}", record.args()),
        };
        eprintln!(
            "{} {:<5} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level,
            entry.message
        );

        let mut entries = self.entries();
        entries.push_back(entry);

        // Keep only the most recent entries
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_ring_keeps_latest_entries() {
        let logger = CliLogger::new(2, LevelFilter::Debug);
        for message in ["one", "two", "three"] {
            logger.log(
                &Record::builder()
                    .level(Level::Warn)
                    .args(format_args!("{}", message))
                    .build(),
            );
        }

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].message, "two");
        assert_eq!(warnings[1].message, "three");

        // The count survives entries falling out of the ring
        assert_eq!(logger.warning_count(), 3);
    }

    #[test]
    fn test_init_installs_global_logger() {
        let logger = CliLogger::new(10, LevelFilter::Info);
        logger.clone().init().unwrap();

        log::warn!("routed through the facade");
        assert_eq!(logger.warning_count(), 1);
        assert_eq!(logger.warnings()[0].message, "routed through the facade");
    }

    #[test]
    fn test_level_filter() {
        let logger = CliLogger::new(10, LevelFilter::Info);
        logger.log(&Record::builder().level(Level::Debug).args(format_args!("hidden")).build());
        logger.log(&Record::builder().level(Level::Info).args(format_args!("shown")).build());

        assert!(logger.warnings().is_empty());
        assert_eq!(logger.warning_count(), 0);
        assert_eq!(logger.entries().len(), 1);
    }
}
