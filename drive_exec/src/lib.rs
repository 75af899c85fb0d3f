//! # Drive library.
//!
//! Gyro-assisted autonomous motion legs for a four wheel mecanum chassis. The
//! executable and the benchmarks access the control core through this crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomous configuration values selected before the match (alliance, start position, delay)
pub mod auto_config;

/// Drive control - encoder and gyro closed loop motion legs
pub mod drive_ctrl;

/// Leg sequencer - runs a script of legs one control cycle at a time
pub mod sequencer;

/// Simulated drivetrain - wheels, IMU and clock for running without hardware
pub mod sim;
