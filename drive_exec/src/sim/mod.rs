//! # Simulated drivetrain
//!
//! A minimal kinematic model of a mecanum chassis used to run the drive legs
//! without hardware. Four [`SimWheel`]s, a [`SimImu`] and a [`SimClock`] all
//! share one [`SimWorld`] state, so the drivetrain can own its parts while the
//! caller keeps a handle to the world to advance and inspect it.
//!
//! Only the yaw of the chassis is modelled. Wheel speeds on each side give a
//! differential yaw rate, and a constant drift can be added to exercise the
//! heading correction.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use log::trace;
use serde::Deserialize;

use comms_if::eqpt::drive::{Actuator, HeadingSensor, RunMode, Wheel, NUM_WHEELS};
use util::{maths::wrap_deg_180, time::Clock};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated chassis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Encoder ticks per wheel revolution reported by the simulated motors.
    pub ticks_per_rev: f64,

    /// Units: revolutions/minute
    pub rated_rpm: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Constant yaw drift added to the chassis, counter-clockwise positive.
    ///
    /// Units: degrees/second
    pub drift_dps: f64,

    /// A wheel in position control is busy while further than this from its
    /// target.
    pub position_tolerance_ticks: f64,

    /// Integration step. A stepping clock advances the world by this much on
    /// every read, and [`SimWorld::advance`] integrates in steps no longer
    /// than this.
    ///
    /// Units: seconds
    pub step_s: f64,
}

/// Handle to the shared simulation state.
#[derive(Clone)]
pub struct SimWorld {
    state: Rc<RefCell<WorldState>>,
}

/// A simulated wheel motor with an encoder.
pub struct SimWheel {
    world: Rc<RefCell<WorldState>>,
    wheel: Wheel,
}

/// A simulated IMU reporting the chassis yaw.
pub struct SimImu {
    world: Rc<RefCell<WorldState>>,
}

/// Reads the simulation time.
///
/// A stepping clock advances the world by its step every time it is read,
/// which lets blocking loops run to completion against the simulation.
pub struct SimClock {
    world: Rc<RefCell<WorldState>>,
    step_s: Option<f64>,
}

struct WorldState {
    params: SimParams,
    wheels: [WheelState; NUM_WHEELS],

    /// Units: degrees, in (-180, 180]
    heading_deg: f64,

    /// Units: seconds
    time_s: f64,
}

#[derive(Debug, Clone, Copy)]
struct WheelState {
    /// Continuous encoder position.
    position: f64,
    target: i32,
    mode: RunMode,

    /// Units: ticks/second
    velocity: f64,

    /// A stalled wheel does not move, whatever it is commanded.
    stalled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 4.0,
            ticks_per_rev: 537.7,
            rated_rpm: 312.0,
            track_width_in: 14.0,
            drift_dps: 0.0,
            position_tolerance_ticks: 5.0,
            step_s: 0.01,
        }
    }
}

impl Default for WheelState {
    fn default() -> Self {
        Self {
            position: 0.0,
            target: 0,
            mode: RunMode::VelocityControl,
            velocity: 0.0,
            stalled: false,
        }
    }
}

impl SimWorld {
    /// Create a world with the chassis at rest, facing 0 degrees.
    pub fn new(params: SimParams) -> Self {
        Self {
            state: Rc::new(RefCell::new(WorldState {
                params,
                wheels: [WheelState::default(); NUM_WHEELS],
                heading_deg: 0.0,
                time_s: 0.0,
            })),
        }
    }

    /// The four wheels, in [`Wheel::index`] order.
    pub fn wheels(&self) -> [SimWheel; NUM_WHEELS] {
        let w = |wheel| SimWheel {
            world: Rc::clone(&self.state),
            wheel,
        };

        [
            w(Wheel::FrontLeft),
            w(Wheel::FrontRight),
            w(Wheel::RearLeft),
            w(Wheel::RearRight),
        ]
    }

    pub fn imu(&self) -> SimImu {
        SimImu {
            world: Rc::clone(&self.state),
        }
    }

    /// A clock which only reads the time. The world must be advanced with
    /// [`SimWorld::step`].
    pub fn clock(&self) -> SimClock {
        SimClock {
            world: Rc::clone(&self.state),
            step_s: None,
        }
    }

    /// A clock which advances the world by the `step_s` parameter on every
    /// read.
    pub fn stepping_clock(&self) -> SimClock {
        let step_s = self.state.borrow().params.step_s;

        SimClock {
            world: Rc::clone(&self.state),
            step_s: Some(step_s),
        }
    }

    /// Advance the world by `dt_s` seconds in a single step.
    pub fn step(&self, dt_s: f64) {
        self.state.borrow_mut().step(dt_s);
    }

    /// Advance the world by `duration_s` seconds in steps of at most the
    /// `step_s` parameter.
    pub fn advance(&self, duration_s: f64) {
        let mut state = self.state.borrow_mut();
        let step_s = state.params.step_s;

        if !(step_s > 0.0) {
            state.step(duration_s);
            return;
        }

        let mut remaining_s = duration_s;
        while remaining_s > 0.0 {
            let dt_s = step_s.min(remaining_s);
            state.step(dt_s);
            remaining_s -= dt_s;
        }
    }

    /// Units: degrees
    pub fn heading_deg(&self) -> f64 {
        self.state.borrow().heading_deg
    }

    /// Units: seconds
    pub fn time_s(&self) -> f64 {
        self.state.borrow().time_s
    }

    pub fn set_stalled(&self, wheel: Wheel, stalled: bool) {
        self.state.borrow_mut().wheels[wheel.index()].stalled = stalled;
    }

    pub fn wheel_position(&self, wheel: Wheel) -> i32 {
        self.state.borrow().wheels[wheel.index()].position.round() as i32
    }

    /// Mean distance travelled by the four wheels since the start.
    ///
    /// Units: inches
    pub fn mean_travel_in(&self) -> f64 {
        let state = self.state.borrow();
        let mean_ticks = state.wheels.iter().map(|w| w.position).sum::<f64>()
            / NUM_WHEELS as f64;

        mean_ticks * state.inches_per_tick()
    }
}

impl WorldState {
    fn inches_per_tick(&self) -> f64 {
        self.params.wheel_diameter_in * PI / self.params.ticks_per_rev
    }

    fn is_busy(&self, wheel: &WheelState) -> bool {
        wheel.mode == RunMode::PositionControl
            && (wheel.target as f64 - wheel.position).abs() > self.params.position_tolerance_ticks
    }

    fn step(&mut self, dt_s: f64) {
        if !(dt_s > 0.0) {
            return;
        }

        let tolerance = self.params.position_tolerance_ticks;
        let mut speeds = [0f64; NUM_WHEELS];

        for (i, w) in self.wheels.iter_mut().enumerate() {
            if w.stalled {
                continue;
            }

            let delta = match w.mode {
                RunMode::VelocityControl => w.velocity * dt_s,
                RunMode::PositionControl => {
                    let remaining = w.target as f64 - w.position;

                    if remaining.abs() <= tolerance {
                        0.0
                    }
                    else {
                        let max_move = w.velocity.abs() * dt_s;
                        remaining.signum() * max_move.min(remaining.abs())
                    }
                },
            };

            w.position += delta;
            speeds[i] = delta / dt_s;
        }

        let left_tps = (speeds[Wheel::FrontLeft.index()] + speeds[Wheel::RearLeft.index()]) / 2.0;
        let right_tps = (speeds[Wheel::FrontRight.index()] + speeds[Wheel::RearRight.index()]) / 2.0;

        let yaw_rate_dps = ((right_tps - left_tps) * self.inches_per_tick()
            / self.params.track_width_in)
            .to_degrees()
            + self.params.drift_dps;

        self.heading_deg = wrap_deg_180(self.heading_deg + yaw_rate_dps * dt_s);
        self.time_s += dt_s;

        trace!(
            "Sim t = {:.3} s, heading {:.2} deg, wheel speeds {:?}",
            self.time_s, self.heading_deg, speeds
        );
    }
}

impl Actuator for SimWheel {
    fn position(&self) -> i32 {
        self.world.borrow().wheels[self.wheel.index()].position.round() as i32
    }

    fn set_target_position(&mut self, ticks: i32) {
        self.world.borrow_mut().wheels[self.wheel.index()].target = ticks;
    }

    fn set_mode(&mut self, mode: RunMode) {
        self.world.borrow_mut().wheels[self.wheel.index()].mode = mode;
    }

    fn set_velocity(&mut self, ticks_per_s: f64) {
        self.world.borrow_mut().wheels[self.wheel.index()].velocity = ticks_per_s;
    }

    fn is_busy(&self) -> bool {
        let world = self.world.borrow();
        world.is_busy(&world.wheels[self.wheel.index()])
    }

    fn rated_rpm(&self) -> f64 {
        self.world.borrow().params.rated_rpm
    }

    fn ticks_per_revolution(&self) -> f64 {
        self.world.borrow().params.ticks_per_rev
    }
}

impl HeadingSensor for SimImu {
    fn heading_deg(&self) -> f64 {
        self.world.borrow().heading_deg
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        let mut world = self.world.borrow_mut();

        if let Some(step_s) = self.step_s {
            world.step(step_s);
        }

        Duration::from_secs_f64(world.time_s.max(0.0))
    }

    fn peek(&self) -> Duration {
        Duration::from_secs_f64(self.world.borrow().time_s.max(0.0))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
