//! Drive control module
//!
//! Closed loop motion legs for a mecanum chassis, fusing wheel encoder
//! positions with IMU heading:
//!
//! - [`ImuDrive`] - drive a distance while holding a heading,
//! - [`MecanumDrive::gyro_turn`] and [`MecanumDrive::gyro_hold`] - spin to and
//!   hold a heading,
//! - [`EncoderDrive`] - encoder-only move with independent wheel distances.
//!
//! All control is proportional only and cooperative: every leg is advanced by
//! one non-blocking call per control cycle, except `gyro_hold` which loops on
//! an injected clock until its hold time has elapsed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod conv;
mod encoder_drive;
mod gyro_turn;
mod imu_drive;
mod params;
mod sink;
mod state;
mod steer;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use conv::*;
pub use encoder_drive::*;
pub use gyro_turn::*;
pub use imu_drive::*;
pub use params::*;
pub use sink::*;
pub use state::*;
pub use steer::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while setting up drive control.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load drive control parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}

/// Progress of an encoder driven leg.
///
/// Every leg starts in `Start`, which is assigned explicitly by the leg's
/// constructor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize)]
pub enum LegState {
    /// Targets have not been computed yet.
    Start,

    /// Wheels are running to their targets.
    Driving,

    /// The leg is over and the wheels have been released. Terminal.
    Stopped,
}
