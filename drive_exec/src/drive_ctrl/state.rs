//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{
    Params,
    SideSpeeds,
    TickConverter, VelocityConverter,
    heading_error_deg};
use comms_if::eqpt::drive::{
    Actuator, HeadingSensor, NullSink, RunMode, StatusSink, Wheel, NUM_WHEELS};
use util::time::{Clock, MonotonicClock};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A four wheel mecanum drivetrain with an IMU.
///
/// Owns the wheel actuators, the heading sensor and the clock for as long as
/// the drivetrain exists. Motion legs borrow it mutably for each tick, so only
/// one leg can command the wheels at a time.
pub struct MecanumDrive<A, H, C = MonotonicClock> {
    pub(crate) params: Params,

    /// Wheels indexed by [`Wheel::index`]
    wheels: [A; NUM_WHEELS],

    imu: H,

    clock: C,

    ticks: TickConverter,

    velocity: VelocityConverter,

    sink: Box<dyn StatusSink>,

    pub(crate) report: StatusReport,
}

/// Status report for DriveCtrl processing, updated whenever the drivetrain is
/// commanded.
///
/// Kept flat so that it can be archived directly as a CSV row.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Clock time of the last update.
    pub time_s: f64,

    /// Heading at the last heading error calculation.
    pub heading_deg: f64,

    /// Last calculated heading error.
    pub heading_error_deg: f64,

    /// Last steering correction, between -1 and 1.
    pub steer: f64,

    /// Last velocity commanded to the left wheels.
    ///
    /// Units: ticks/second
    pub left_velocity_tps: f64,

    /// Last velocity commanded to the right wheels.
    ///
    /// Units: ticks/second
    pub right_velocity_tps: f64,

    pub fl_target: i32,
    pub fr_target: i32,
    pub rl_target: i32,
    pub rr_target: i32,

    pub fl_position: i32,
    pub fr_position: i32,
    pub rl_position: i32,
    pub rr_position: i32,

    /// Raised when a leg was stopped by its timeout rather than by a wheel
    /// reaching its target.
    pub timed_out: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A, H, C> MecanumDrive<A, H, C>
where
    A: Actuator,
    H: HeadingSensor,
    C: Clock,
{
    /// Build the drivetrain from its parts.
    ///
    /// The wheels are put into velocity control and stopped, so that every leg
    /// starts from a known mode.
    pub fn new(params: Params, wheels: [A; NUM_WHEELS], imu: H, clock: C) -> Self {
        let reference = &wheels[Wheel::FrontLeft.index()];

        let ticks_per_rev = params
            .geared_ticks_per_rev()
            .unwrap_or_else(|| reference.ticks_per_revolution());
        let rated_rpm = params
            .rated_rpm
            .unwrap_or_else(|| reference.rated_rpm());

        let ticks = TickConverter::new(params.wheel_diameter_in, ticks_per_rev);
        let velocity = VelocityConverter::new(rated_rpm, ticks_per_rev);

        info!(
            "DriveCtrl geometry: {:.3} ticks/in, {:.1} ticks/s at full power",
            ticks.counts_per_inch(),
            velocity.max_ticks_per_s()
        );

        let mut drive = Self {
            params,
            wheels,
            imu,
            clock,
            ticks,
            velocity,
            sink: Box::new(NullSink),
            report: StatusReport::default(),
        };

        drive.release();

        drive
    }

    /// Replace the status sink (a [`NullSink`] by default). Pass an
    /// `Rc<RefCell<_>>` to keep reading the lines afterwards.
    pub fn with_status_sink(mut self, sink: Box<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn tick_converter(&self) -> &TickConverter {
        &self.ticks
    }

    pub fn velocity_converter(&self) -> &VelocityConverter {
        &self.velocity
    }

    pub fn wheel(&self, wheel: Wheel) -> &A {
        &self.wheels[wheel.index()]
    }

    pub fn wheel_mut(&mut self, wheel: Wheel) -> &mut A {
        &mut self.wheels[wheel.index()]
    }

    pub fn imu(&self) -> &H {
        &self.imu
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The latest status report.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Current clock time.
    ///
    /// Units: seconds
    pub fn now_s(&self) -> f64 {
        self.clock.now().as_secs_f64()
    }

    /// Current encoder positions of all wheels.
    pub fn positions(&self) -> [i32; NUM_WHEELS] {
        let mut pos = [0i32; NUM_WHEELS];
        for w in Wheel::ALL.iter() {
            pos[w.index()] = self.wheels[w.index()].position();
        }
        pos
    }

    /// `true` while every wheel is still pursuing its position target.
    pub fn all_busy(&self) -> bool {
        self.wheels.iter().all(|w| w.is_busy())
    }

    /// Heading error to an absolute target, read from a fresh IMU sample.
    ///
    /// Units: degrees, in (-180, 180]. Positive means turn left.
    pub fn heading_error(&self, target_deg: f64) -> f64 {
        heading_error_deg(target_deg, self.imu.heading_deg())
    }

    /// Read the heading error and record it in the status report.
    pub(crate) fn measure_heading_error(&mut self, target_deg: f64) -> f64 {
        let heading_deg = self.imu.heading_deg();
        let error = heading_error_deg(target_deg, heading_deg);

        self.report.heading_deg = heading_deg;
        self.report.heading_error_deg = error;

        error
    }

    /// Command zero velocity on all wheels without changing their mode.
    pub fn gyro_stop(&mut self) {
        self.set_side_speeds(SideSpeeds::default());
    }

    /// Stop all wheels and return them to velocity control.
    pub fn release(&mut self) {
        self.gyro_stop();

        for w in self.wheels.iter_mut() {
            w.set_mode(RunMode::VelocityControl);
        }

        debug!("DriveCtrl wheels stopped and released to velocity control");
    }

    /// Convert normalised side speeds to velocities and command the left
    /// (front-left, rear-left) and right (front-right, rear-right) wheels.
    pub(crate) fn set_side_speeds(&mut self, speeds: SideSpeeds) {
        let left = self.velocity.power_to_velocity(speeds.left);
        let right = self.velocity.power_to_velocity(speeds.right);

        for w in Wheel::ALL.iter() {
            let v = if w.is_left() { left } else { right };
            self.wheels[w.index()].set_velocity(v);
        }

        self.report.left_velocity_tps = left;
        self.report.right_velocity_tps = right;
        self.update_report_time();

        trace!("DriveCtrl velocities: left {:.1}, right {:.1}", left, right);
    }

    /// Set a position target on every wheel, offset from the wheel's current
    /// position by its distance, switch to position control and start all
    /// wheels at the given speed.
    ///
    /// `speed` must already be clamped to [0, 1]. Returns the targets.
    pub(crate) fn arm_position_targets(
        &mut self,
        distances_in: [f64; NUM_WHEELS],
        speed: f64,
    ) -> [i32; NUM_WHEELS] {
        let mut targets = [0i32; NUM_WHEELS];

        for w in Wheel::ALL.iter() {
            let i = w.index();
            let offset = self.ticks.inches_to_ticks(distances_in[i]);
            targets[i] = self.wheels[i].position().saturating_add(offset);

            self.wheels[i].set_target_position(targets[i]);
            self.wheels[i].set_mode(RunMode::PositionControl);
        }

        self.set_side_speeds(SideSpeeds {
            left: speed,
            right: speed,
        });

        self.report.fl_target = targets[Wheel::FrontLeft.index()];
        self.report.fr_target = targets[Wheel::FrontRight.index()];
        self.report.rl_target = targets[Wheel::RearLeft.index()];
        self.report.rr_target = targets[Wheel::RearRight.index()];
        self.report.timed_out = false;

        targets
    }

    /// Record the current wheel positions in the report and emit the target
    /// and position status lines.
    pub(crate) fn report_positions(&mut self) {
        let pos = self.positions();

        self.report.fl_position = pos[Wheel::FrontLeft.index()];
        self.report.fr_position = pos[Wheel::FrontRight.index()];
        self.report.rl_position = pos[Wheel::RearLeft.index()];
        self.report.rr_position = pos[Wheel::RearRight.index()];

        let targets = format!(
            "{:7} :{:7} :{:7} :{:7}",
            self.report.fl_target, self.report.fr_target,
            self.report.rl_target, self.report.rr_target
        );
        let positions = format!(
            "{:7} :{:7} :{:7} :{:7}",
            pos[0], pos[1], pos[2], pos[3]
        );

        self.sink.add_data("Running to", &targets);
        self.sink.add_data("Running at", &positions);
    }

    /// Emit a status line.
    pub(crate) fn status(&mut self, key: &str, value: &str) {
        self.sink.add_data(key, value);
    }

    /// Stamp the report without advancing a clock which steps on read.
    fn update_report_time(&mut self) {
        self.report.time_s = self.clock.peek().as_secs_f64();
    }
}
