//! # Autonomous script interpreter module
//!
//! This module provides an interpreter for autonomous leg scripts. A script is
//! a list of entries of the form
//!
//! ```text
//! <pause_s>: <leg json>;
//! ```
//!
//! where `pause_s` is the time to wait before starting the leg and the JSON is
//! a [`LegCmd`]. Anything which doesn't match an entry (blank lines, `#`
//! comments) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::tc::{leg::LegCmd, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A leg which is scripted to start after a pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedLeg {
    /// Time to wait after the previous leg before starting this one
    pub pause_s: f64,

    /// The leg to run
    pub leg: LegCmd
}

/// A script interpreter.
///
/// After initialising with the path to the script use `.next_leg` to take the
/// legs in order.
#[derive(Debug)]
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    legs: VecDeque<ScriptedLeg>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid pause: {0}. \
        Should be a float (like 1.0)")]
    InvalidPause(String),

    #[error("Script contains an invalid leg (number {0}): {1}")]
    InvalidLeg(usize, TcParseError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the text of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of legs
        let mut leg_queue: VecDeque<ScriptedLeg> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(-?\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Leg script regex is invalid");

        for cap in re.captures_iter(script) {
            // Parse the pause
            let pause_s: f64 = match cap[1].parse() {
                Ok(t) => t,
                Err(e) => return Err(
                    ScriptError::InvalidPause(format!("{}", e)))
            };
            if pause_s < 0.0 {
                return Err(ScriptError::InvalidPause(format!(
                    "{} is negative", pause_s
                )))
            }

            // Parse the leg from the payload. The scripts contain JSON only.
            let leg = LegCmd::from_json(cap[3].trim())
                .map_err(|e| ScriptError::InvalidLeg(leg_queue.len(), e))?;

            leg_queue.push_back(ScriptedLeg {
                pause_s,
                leg
            });
        }

        if leg_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            script_path: None,
            legs: leg_queue
        })
    }

    /// Take the next leg from the script, or `None` at the end of the script.
    pub fn next_leg(&mut self) -> Option<ScriptedLeg> {
        self.legs.pop_front()
    }

    /// Get the number of legs remaining in the script
    pub fn get_num_legs(&self) -> usize {
        self.legs.len()
    }

    /// Get the sum of all pauses remaining in the script in seconds
    pub fn get_total_pause(&self) -> f64 {
        self.legs.iter().map(|l| l.pause_s).sum()
    }

    /// The file the script was loaded from, if any
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

impl IntoIterator for ScriptInterpreter {
    type Item = ScriptedLeg;
    type IntoIter = std::collections::vec_deque::IntoIter<ScriptedLeg>;

    fn into_iter(self) -> Self::IntoIter {
        self.legs.into_iter()
    }
}
