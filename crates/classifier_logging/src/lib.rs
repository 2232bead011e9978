#![deny(missing_docs)]
//! Logging for the URL classifier.
//!
//! Engine and front end log through the `classifier_*` macros. The binary
//! sets up the backends with [`initialize`]; classification results go to
//! stdout, so terminal logging always writes to stderr.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    TestLogger, WriteLogger,
};

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! classifier_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Log file name used when none is configured.
pub const DEFAULT_LOG_FILE: &str = "url_classifier.log";

/// Where log records end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Only the log file.
    File,
    /// Only stderr.
    #[default]
    Terminal,
    /// Log file and stderr.
    Both,
}

/// Level for the binary: debug when verbose, info otherwise.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the global logger. Later calls leave the first logger in place.
///
/// The file at `log_path` is truncated. When it cannot be created, a warning
/// goes to stderr and only the terminal logger (if any) is installed.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = record_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        if let Some(file_logger) = open_log_file(level, config, log_path) {
            loggers.push(file_logger);
        }
    }

    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

/// `./url_classifier.log`.
pub fn default_log_path() -> PathBuf {
    PathBuf::from(".").join(DEFAULT_LOG_FILE)
}

/// Logger for test binaries; output is captured by the test harness.
///
/// No-op when a logger is already installed.
pub fn initialize_for_tests() {
    let _ = CombinedLogger::init(vec![TestLogger::new(
        level_for(cfg!(debug_assertions)),
        Config::default(),
    )]);
}

fn record_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn open_log_file(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    File::create(log_path)
        .map(|file| WriteLogger::new(level, config, file))
        .map_err(|err| {
            eprintln!(
                "Warning: cannot open log file {}: {}",
                log_path.display(),
                err
            )
        })
        .ok()
}
