//! # Communications interface crate.
//!
//! Provides the interfaces shared between the drive control core and the
//! equipment and command sources around it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand definitions, i.e. the motion legs the drive can be asked to perform
pub mod tc;

/// Capability interfaces for equipment (wheel actuators, heading sensor)
pub mod eqpt;
