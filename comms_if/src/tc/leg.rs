//! # Motion leg telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::TcParseError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A discrete motion instruction that can be completed by drive control.
///
/// Headings are absolute, in degrees relative to the last IMU reset. 0 is forwards, positive
/// headings are counter-clockwise from forwards and negative headings clockwise.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum LegCmd {
    /// Drive a distance along the chassis' forward axis while holding a heading with the gyro.
    Drive {
        /// Speed magnitude between 0 and 1. Values outside this range are clamped.
        speed: f64,

        /// Distance to travel in inches. Negative distances drive backwards.
        distance_in: f64,

        /// Heading to hold while driving.
        heading_deg: f64,

        /// Optional failsafe after which the leg is stopped even if no wheel reached its target.
        #[serde(default)]
        timeout_s: Option<f64>,
    },

    /// Spin on the spot until the robot points at the given heading.
    Turn {
        /// Turn speed between 0 and 1.
        speed: f64,

        /// Heading to turn to.
        heading_deg: f64,
    },

    /// Turn to and hold a heading for a fixed amount of time.
    Hold {
        /// Turn speed between 0 and 1.
        speed: f64,

        /// Heading to hold.
        heading_deg: f64,

        /// Length of time to hold the heading for.
        hold_s: f64,
    },

    /// Encoder-only relative move with an independent distance per wheel.
    ///
    /// Equal distances drive straight, `[-d, d, d, -d]` strafes left, `[d, -d, d, -d]` pivots
    /// clockwise.
    Encoder {
        /// Speed magnitude between 0 and 1.
        speed: f64,

        /// Distance for each wheel in inches, ordered front-left, front-right, rear-left,
        /// rear-right.
        distances_in: [f64; 4],

        /// Time after which the leg is abandoned.
        timeout_s: f64,
    },

    /// Stop all wheels.
    Stop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LegCmd {
    /// Parse a leg from its JSON representation, for example
    /// `{"Drive": {"speed": 0.5, "distance_in": 48.0, "heading_deg": 0.0}}`.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let cmd: LegCmd = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        cmd.validate()?;

        Ok(cmd)
    }

    /// Check that every number in the leg is usable.
    ///
    /// Out-of-range speeds are accepted since drive control clamps them, but non-finite values and
    /// negative durations are rejected.
    pub fn validate(&self) -> Result<(), TcParseError> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(TcParseError::InvalidLeg(format!("{} must be finite, got {}", name, v)))
            }
        };

        match *self {
            LegCmd::Drive {
                speed,
                distance_in,
                heading_deg,
                timeout_s,
            } => {
                finite("speed", speed)?;
                finite("distance_in", distance_in)?;
                finite("heading_deg", heading_deg)?;
                if let Some(t) = timeout_s {
                    positive("timeout_s", t)?;
                }
            }
            LegCmd::Turn { speed, heading_deg } => {
                finite("speed", speed)?;
                finite("heading_deg", heading_deg)?;
            }
            LegCmd::Hold {
                speed,
                heading_deg,
                hold_s,
            } => {
                finite("speed", speed)?;
                finite("heading_deg", heading_deg)?;
                finite("hold_s", hold_s)?;
                if hold_s < 0.0 {
                    return Err(TcParseError::InvalidLeg(format!(
                        "hold_s must not be negative, got {}",
                        hold_s
                    )));
                }
            }
            LegCmd::Encoder {
                speed,
                distances_in,
                timeout_s,
            } => {
                finite("speed", speed)?;
                for d in distances_in.iter() {
                    finite("distances_in", *d)?;
                }
                positive("timeout_s", timeout_s)?;
            }
            LegCmd::Stop => (),
        }

        Ok(())
    }
}

fn positive(name: &str, v: f64) -> Result<(), TcParseError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(TcParseError::InvalidLeg(format!(
            "{} must be a positive number of seconds, got {}",
            name, v
        )))
    }
}
