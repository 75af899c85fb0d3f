//! # Equipment Interface
//!
//! This module defines the capability sets the drive control core requires
//! from the equipment it is given.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
