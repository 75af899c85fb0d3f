//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::DriveCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
///
/// Every field has a default, so a parameter file only needs to name the
/// values which differ for a particular robot.
///
/// Geometry values must be positive. They are not checked: a zero or negative
/// wheel diameter or tick count produces meaningless (but finite or saturated)
/// motion commands rather than an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Diameter of the mecanum wheels.
    ///
    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Encoder counts per revolution of the bare motor, before the gearbox.
    ///
    /// If not set the wheel actuators' own ticks per output revolution are
    /// used and `drive_gear_reduction` is ignored.
    pub counts_per_motor_rev: Option<f64>,

    /// Reduction between the motor and the wheel, less than 1 if geared up.
    pub drive_gear_reduction: f64,

    /// Rated motor speed. If not set the actuators' rated RPM is used.
    ///
    /// Units: revolutions/minute
    pub rated_rpm: Option<f64>,

    // ---- CONTROL ----

    /// Heading error under which a turn is considered complete.
    ///
    /// Units: degrees
    pub heading_threshold_deg: f64,

    /// Proportional gain for spin-in-place turns and holds.
    pub p_turn_coeff: f64,

    /// Proportional gain for heading correction while driving straight.
    pub p_drive_coeff: f64,

    /// Failsafe applied to drive legs which don't carry their own timeout.
    /// `None` lets a drive leg run until a wheel reaches its target.
    ///
    /// Units: seconds
    pub drive_timeout_s: Option<f64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 4.0,
            counts_per_motor_rev: None,
            drive_gear_reduction: 1.0,
            rated_rpm: None,
            heading_threshold_deg: 1.0,
            p_turn_coeff: 0.1,
            p_drive_coeff: 0.15,
            drive_timeout_s: None,
        }
    }
}

impl Params {
    /// Load the parameters from a file relative to the parameters directory.
    pub fn load(param_file_path: &str) -> Result<Self, DriveCtrlError> {
        util::params::load(param_file_path).map_err(DriveCtrlError::ParamLoadError)
    }

    /// Ticks per wheel revolution from the motor counts and gearing, if the
    /// motor counts are configured.
    pub fn geared_ticks_per_rev(&self) -> Option<f64> {
        self.counts_per_motor_rev
            .map(|c| c * self.drive_gear_reduction)
    }
}
