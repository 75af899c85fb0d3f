//! Unit conversions between wheel travel, encoder ticks and motor velocity

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts linear wheel travel to encoder ticks and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickConverter {
    /// Units: inches
    wheel_diameter_in: f64,

    /// Encoder ticks per revolution of the wheel
    ticks_per_rev: f64,
}

/// Converts normalised power into actuator velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityConverter {
    /// Velocity at full power.
    ///
    /// Units: ticks/second
    max_ticks_per_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TickConverter {
    /// Both values must be positive for the conversion to mean anything.
    pub fn new(wheel_diameter_in: f64, ticks_per_rev: f64) -> Self {
        Self {
            wheel_diameter_in,
            ticks_per_rev,
        }
    }

    /// Units: inches
    pub fn circumference_in(&self) -> f64 {
        self.wheel_diameter_in * PI
    }

    /// Encoder ticks per inch of travel.
    pub fn counts_per_inch(&self) -> f64 {
        self.ticks_per_rev / self.circumference_in()
    }

    /// Convert a signed distance to the nearest whole number of ticks.
    ///
    /// Non-finite or out of range results saturate to the `i32` limits (or 0
    /// for NaN) instead of panicking.
    pub fn inches_to_ticks(&self, inches: f64) -> i32 {
        let rotations = inches / self.circumference_in();
        (rotations * self.ticks_per_rev).round() as i32
    }

    /// Convert ticks back into a distance.
    pub fn ticks_to_inches(&self, ticks: i32) -> f64 {
        ticks as f64 / self.ticks_per_rev * self.circumference_in()
    }
}

impl VelocityConverter {
    pub fn new(rated_rpm: f64, ticks_per_rev: f64) -> Self {
        Self {
            max_ticks_per_s: rated_rpm / 60.0 * ticks_per_rev,
        }
    }

    /// Units: ticks/second
    pub fn max_ticks_per_s(&self) -> f64 {
        self.max_ticks_per_s
    }

    /// Scale a power into a velocity. The power is not clamped, callers limit
    /// it to [-1, 1] first.
    pub fn power_to_velocity(&self, power: f64) -> f64 {
        self.max_ticks_per_s * power
    }
}
