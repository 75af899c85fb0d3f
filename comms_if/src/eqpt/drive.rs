//! # Drive Equipment Interface
//!
//! Capability traits for the hardware the drive control core talks to. The
//! surrounding application builds concrete implementations (real motor
//! controllers, the simulation, or test fakes) and injects them into the core.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of driven wheels on a mecanum chassis.
pub const NUM_WHEELS: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operating mode of a wheel actuator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// The actuator drives itself to its target position, using the magnitude of the commanded
    /// velocity as the speed limit. It is busy until the target is reached.
    PositionControl,

    /// The actuator holds the commanded velocity.
    VelocityControl,
}

/// Identifies one of the four wheels. The discriminant is the wheel's index in per-wheel arrays.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wheel {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single encoder-equipped wheel motor.
pub trait Actuator {
    /// Current encoder position in ticks.
    fn position(&self) -> i32;

    /// Set the position the actuator pursues while in [`RunMode::PositionControl`].
    fn set_target_position(&mut self, ticks: i32);

    /// Switch the operating mode.
    fn set_mode(&mut self, mode: RunMode);

    /// Command a velocity in ticks/second.
    fn set_velocity(&mut self, ticks_per_s: f64);

    /// `true` while the actuator is still pursuing its position target.
    fn is_busy(&self) -> bool;

    /// Rated no-load speed of the motor.
    ///
    /// Units: revolutions/minute
    fn rated_rpm(&self) -> f64;

    /// Encoder ticks per revolution of the output shaft.
    fn ticks_per_revolution(&self) -> f64;
}

/// A heading (yaw) sensor, such as an IMU.
pub trait HeadingSensor {
    /// Heading relative to the last sensor reset, counter-clockwise positive.
    ///
    /// Units: degrees
    fn heading_deg(&self) -> f64;
}

/// Signal polled once per loop iteration to decide whether motion may continue.
///
/// The core never owns this signal, it only reads it. Any `Fn() -> bool` is a token, so a shared
/// flag can be passed as `|| flag.load(Ordering::Relaxed)`.
pub trait ActiveToken {
    fn is_active(&self) -> bool;
}

/// Receiver for human readable key/value status lines (targets, positions, heading error).
///
/// The format of the values is not contractual, it is intended for display only.
pub trait StatusSink {
    fn add_data(&mut self, key: &str, value: &str);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A status sink which discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Wheel {
    /// All wheels in index order.
    pub const ALL: [Wheel; NUM_WHEELS] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    /// Index of this wheel in per-wheel arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// `true` for the wheels on the left side of the chassis.
    pub fn is_left(self) -> bool {
        matches!(self, Wheel::FrontLeft | Wheel::RearLeft)
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn position(&self) -> i32 {
        (**self).position()
    }

    fn set_target_position(&mut self, ticks: i32) {
        (**self).set_target_position(ticks)
    }

    fn set_mode(&mut self, mode: RunMode) {
        (**self).set_mode(mode)
    }

    fn set_velocity(&mut self, ticks_per_s: f64) {
        (**self).set_velocity(ticks_per_s)
    }

    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }

    fn rated_rpm(&self) -> f64 {
        (**self).rated_rpm()
    }

    fn ticks_per_revolution(&self) -> f64 {
        (**self).ticks_per_revolution()
    }
}

impl<T: HeadingSensor + ?Sized> HeadingSensor for Box<T> {
    fn heading_deg(&self) -> f64 {
        (**self).heading_deg()
    }
}

impl<F> ActiveToken for F
where
    F: Fn() -> bool,
{
    fn is_active(&self) -> bool {
        self()
    }
}

impl StatusSink for NullSink {
    fn add_data(&mut self, _key: &str, _value: &str) {}
}

/// Collects status lines, mostly useful for tests and for building telemetry packets.
impl StatusSink for Vec<(String, String)> {
    fn add_data(&mut self, key: &str, value: &str) {
        self.push((key.to_string(), value.to_string()));
    }
}

/// A sink shared with its owner, so the lines can be read back while the core holds it.
impl<S: StatusSink + ?Sized> StatusSink for Rc<RefCell<S>> {
    fn add_data(&mut self, key: &str, value: &str) {
        self.borrow_mut().add_data(key, value)
    }
}
