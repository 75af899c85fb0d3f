//! Logger set up for the drive executables
//!
//! Ordinary records go to stdout and the session log file. Drive status lines,
//! logged under [`STATUS_TARGET`], are high rate and are only written to the
//! log file, with their own level so they can be switched on without turning
//! on debug output everywhere else.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Log target of the drive status lines.
pub const STATUS_TARGET: &str = "drive_status";

/// Level the status lines are logged at.
pub const STATUS_LEVEL: log::Level = log::Level::Debug;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Levels to initialise the logger with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    /// Minimum level for everything except the status lines, at least `Info`.
    pub min: LevelFilter,

    /// Level for the status lines. They are recorded only if this admits
    /// [`STATUS_LEVEL`].
    pub status: LevelFilter,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Could not open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Could not install the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            min: LevelFilter::Info,
            status: LevelFilter::Off,
        }
    }
}

impl LogLevels {
    /// Check the levels. Drive state transitions are logged at `Info` and must
    /// never be filtered out.
    pub fn validate(&self) -> Result<(), LoggerInitError> {
        if self.min < log::Level::Info {
            Err(LoggerInitError::InvalidMinLogLevel(self.min))
        }
        else {
            Ok(())
        }
    }

    /// `true` if status lines will be recorded.
    pub fn status_enabled(&self) -> bool {
        self.status >= STATUS_LEVEL
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Every record is stamped with the time elapsed since the session epoch.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    levels: LogLevels,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    levels.validate()?;

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .filter(|meta| meta.target() != STATUS_TARGET)
        .chain(std::io::stdout());

    fern::Dispatch::new()
        .format(|out, message, record| {
            let tag = record_tag(record.level(), record.target());

            // Status lines and info or above read without their target
            if record.target() == STATUS_TARGET || record.level() <= log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    tag,
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    tag,
                    record.target(),
                    message
                ))
            }
        })
        .level(levels.min)
        .level_for(STATUS_TARGET, levels.status)
        .chain(stdout)
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", levels.min);
    info!(
        "    Drive status lines: {}",
        if levels.status_enabled() { "log file only" } else { "off" }
    );
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Short tag for a record, status lines having their own.
fn record_tag(level: log::Level, target: &str) -> ColoredString {
    if target == STATUS_TARGET {
        return "STS".cyan();
    }

    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
