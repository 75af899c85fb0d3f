//! # Telecommand module
//!
//! This module provides the motion leg commands which the drive executes, as
//! parsed from autonomous scripts.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod leg;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC describes an invalid leg: {0}")]
    InvalidLeg(String),
}
