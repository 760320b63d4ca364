//! Host logger setup, driven by the `logging` section of `participe.ron`.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    #[default]
    Terminal,
    File,
    Both,
}

impl LogDestination {
    fn to_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub destination: LogDestination,
    pub level: LogLevel,
    /// Truncated at startup when the destination includes a file.
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            destination: LogDestination::default(),
            level: LogLevel::default(),
            file: PathBuf::from("participe.log"),
        }
    }
}

/// Installs the global logger. Only the first call in a process has an effect.
pub fn initialize(config: &LoggingConfig) {
    let _ = CombinedLogger::init(build_loggers(config));
}

/// A file that cannot be created falls back to the terminal so diagnostics
/// about failed submissions are never silently lost.
fn build_loggers(config: &LoggingConfig) -> Vec<Box<dyn SharedLogger>> {
    let level = LevelFilter::from(config.level);
    let format = record_format();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if config.destination.to_file() {
        match File::create(&config.file) {
            Ok(file) => loggers.push(WriteLogger::new(level, format.clone(), file)),
            Err(err) => eprintln!(
                "participe: cannot write log file {}: {err}",
                config.file.display()
            ),
        }
    }
    if config.destination.to_terminal() || loggers.is_empty() {
        loggers.push(TermLogger::new(
            level,
            format,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    loggers
}

// HTTP client internals log under their own targets; only ours are kept.
fn record_format() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("participe")
        .build()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn file_destination_creates_the_configured_file() {
        let temp = TempDir::new().unwrap();
        let config = LoggingConfig {
            destination: LogDestination::File,
            level: LogLevel::Debug,
            file: temp.path().join("envios.log"),
        };

        let loggers = build_loggers(&config);

        assert_eq!(loggers.len(), 1);
        assert_eq!(loggers[0].level(), LevelFilter::Debug);
        assert!(config.file.exists());
    }

    #[test]
    fn both_destinations_install_two_loggers() {
        let temp = TempDir::new().unwrap();
        let config = LoggingConfig {
            destination: LogDestination::Both,
            level: LogLevel::Warn,
            file: temp.path().join("participe.log"),
        };

        let loggers = build_loggers(&config);

        assert_eq!(loggers.len(), 2);
        assert!(loggers
            .iter()
            .all(|logger| logger.level() == LevelFilter::Warn));
    }

    #[test]
    fn unwritable_file_falls_back_to_terminal() {
        let temp = TempDir::new().unwrap();
        let config = LoggingConfig {
            destination: LogDestination::File,
            file: temp.path().join("no-such-dir").join("participe.log"),
            ..LoggingConfig::default()
        };

        let loggers = build_loggers(&config);

        assert_eq!(loggers.len(), 1);
        assert_eq!(loggers[0].level(), LevelFilter::Info);
        assert!(!config.file.exists());
    }
}
