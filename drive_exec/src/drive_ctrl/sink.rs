//! Status sink which forwards drive status lines to the logger

use comms_if::eqpt::drive::StatusSink;
use log::log;
use util::logger::{STATUS_LEVEL, STATUS_TARGET};

/// Writes every status line to the log under [`STATUS_TARGET`], which the
/// logger filters with its own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn add_data(&mut self, key: &str, value: &str) {
        log!(target: STATUS_TARGET, STATUS_LEVEL, "{}: {}", key, value);
    }
}
