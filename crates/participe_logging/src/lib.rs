#![deny(missing_docs)]
//! Shared logging utilities for the participe workspace.
//!
//! This crate provides the `participe_*` logging macros used across the
//! codebase, a test initializer for the global logger, and an in-memory
//! capture logger so tests can assert that a diagnostic was written.

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use simplelog::{Config, SharedLogger};

#[doc(hidden)]
pub use log;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! participe_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! participe_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! participe_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! participe_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! participe_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// A log record retained by [`CaptureLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    /// Severity of the record.
    pub level: Level,
    /// Module path or explicit target of the record.
    pub target: String,
    /// Fully formatted message.
    pub message: String,
}

static CAPTURED: Mutex<Vec<CapturedRecord>> = Mutex::new(Vec::new());

/// Logger that keeps every record in process memory.
///
/// Records are shared by every thread of the process, so tests filtering
/// them should match on content unique to the test.
pub struct CaptureLogger {
    level: LevelFilter,
}

impl CaptureLogger {
    /// Creates a boxed capture logger ready for `CombinedLogger`.
    pub fn new(level: LevelFilter) -> Box<Self> {
        Box::new(Self { level })
    }
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let captured = CapturedRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };
        if let Ok(mut records) = CAPTURED.lock() {
            records.push(captured);
        }
    }

    fn flush(&self) {}
}

impl SharedLogger for CaptureLogger {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn config(&self) -> Option<&Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        self
    }
}

/// Returns a copy of every record captured so far.
pub fn captured_records() -> Vec<CapturedRecord> {
    CAPTURED
        .lock()
        .map(|records| records.clone())
        .unwrap_or_default()
}

/// Initializes a terminal logger plus the capture logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![
        TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        CaptureLogger::new(LevelFilter::Debug),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_logger_records_formatted_messages() {
        initialize_for_tests();
        participe_error!("capture probe attempt={}", 4242);
        participe_trace!("below capture threshold 4242");

        let records = captured_records();
        let probe = records
            .iter()
            .find(|record| record.message == "capture probe attempt=4242")
            .expect("probe captured");
        assert_eq!(probe.level, Level::Error);
        assert!(!records
            .iter()
            .any(|record| record.message == "below capture threshold 4242"));
    }
}
