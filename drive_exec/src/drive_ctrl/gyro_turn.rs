//! Spin-in-place turn and heading hold

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::thread;
use log::{debug, warn};
use serde::Serialize;

// Internal
use super::{MecanumDrive, mix_turn, steer};
use comms_if::eqpt::drive::{Actuator, ActiveToken, HeadingSensor};
use util::time::Clock;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a heading hold ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum HoldOutcome {
    /// The hold time elapsed.
    Completed,

    /// The active token went false before the hold time elapsed.
    Cancelled,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Non-blocking form of [`MecanumDrive::gyro_hold`], stepped once per control
/// cycle.
#[derive(Debug, Clone)]
pub struct GyroHold {
    speed: f64,
    heading_deg: f64,
    hold_s: f64,

    /// Clock time of the first step.
    start_s: Option<f64>,

    done: bool,
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
    /// Turn towards `angle_deg` with a proportional correction.
    ///
    /// Returns `true`, with every wheel stopped, once the heading error is
    /// within the heading threshold. Otherwise the sides are driven in
    /// opposite directions and `false` is returned.
    pub fn on_heading(&mut self, speed: f64, angle_deg: f64, p_coeff: f64) -> bool {
        let speed = speed.abs().min(1.0);
        let error = self.measure_heading_error(angle_deg);

        let (on_target, steer) = if error.abs() <= self.params.heading_threshold_deg {
            self.gyro_stop();
            (true, 0.0)
        }
        else {
            let steer = steer(error, p_coeff);
            self.set_side_speeds(mix_turn(speed, steer));
            (false, steer)
        };

        self.report.steer = steer;
        self.status("Target", &format!("{:5.2}", angle_deg));
        self.status("Err/St", &format!("{:5.2}/{:5.2}", error, steer));

        on_target
    }

    /// One cycle of a turn to `angle_deg`, using the turn gain. Returns `true`
    /// once on target.
    pub fn gyro_turn(&mut self, speed: f64, angle_deg: f64) -> bool {
        let p_coeff = self.params.p_turn_coeff;
        self.on_heading(speed, angle_deg, p_coeff)
    }

    /// Hold `angle_deg` for `hold_s` seconds of clock time, then stop all
    /// wheels.
    ///
    /// This blocks the caller. `active` is checked on every iteration and the
    /// hold is abandoned, with the wheels stopped, as soon as it goes false.
    pub fn gyro_hold<T>(
        &mut self,
        speed: f64,
        angle_deg: f64,
        hold_s: f64,
        active: &T,
    ) -> HoldOutcome
    where
        T: ActiveToken + ?Sized,
    {
        let p_coeff = self.params.p_turn_coeff;
        let start = self.clock().now();

        debug!("Holding {:.1} deg for {:.2} s", angle_deg, hold_s);

        loop {
            if !active.is_active() {
                self.gyro_stop();
                warn!("Heading hold cancelled");
                return HoldOutcome::Cancelled;
            }

            let elapsed_s = self.clock().now().saturating_sub(start).as_secs_f64();
            if !(elapsed_s < hold_s) {
                break;
            }

            self.on_heading(speed, angle_deg, p_coeff);
            thread::yield_now();
        }

        self.gyro_stop();

        HoldOutcome::Completed
    }
}

impl GyroHold {
    pub fn new(speed: f64, heading_deg: f64, hold_s: f64) -> Self {
        Self {
            speed,
            heading_deg,
            hold_s,
            start_s: None,
            done: false,
        }
    }

    /// Run one cycle of the hold. Returns `true`, with the wheels stopped,
    /// once the hold time has elapsed.
    pub fn step<A, H, C>(&mut self, drive: &mut MecanumDrive<A, H, C>) -> bool
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
    {
        if self.done {
            return true;
        }

        let now_s = drive.now_s();
        let start_s = *self.start_s.get_or_insert(now_s);

        if !(now_s - start_s < self.hold_s) {
            drive.gyro_stop();
            self.done = true;
            return true;
        }

        let p_coeff = drive.params().p_turn_coeff;
        drive.on_heading(self.speed, self.heading_deg, p_coeff);

        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::state::test::{fake_drive, fake_drive_with_lines, last_line};
    use comms_if::eqpt::drive::{Wheel, NUM_WHEELS};
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn test_on_heading_within_threshold() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        drive.set_side_speeds(super::super::SideSpeeds { left: 0.3, right: -0.3 });

        drive.imu().heading.set(0.5);
        assert!(drive.on_heading(0.5, 0.0, 0.1));

        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).velocity, 0.0);
        }
        assert_eq!(drive.report().steer, 0.0);
    }

    #[test]
    fn test_on_heading_full_steer() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let max = drive.velocity_converter().max_ticks_per_s();

        drive.imu().heading.set(0.0);
        assert!(!drive.on_heading(0.5, 90.0, 0.1));

        assert_eq!(drive.report().steer, 1.0);
        assert_eq!(drive.wheel(Wheel::FrontRight).velocity, 0.5 * max);
        assert_eq!(drive.wheel(Wheel::RearRight).velocity, 0.5 * max);
        assert_eq!(drive.wheel(Wheel::FrontLeft).velocity, -0.5 * max);
        assert_eq!(drive.wheel(Wheel::RearLeft).velocity, -0.5 * max);

        // Turning right takes the shortest path
        drive.imu().heading.set(170.0);
        assert!(!drive.on_heading(0.5, -170.0, 0.1));
        assert!((drive.report().heading_error_deg - 20.0).abs() < 1e-9);
        assert!(drive.wheel(Wheel::FrontRight).velocity > 0.0);
    }

    #[test]
    fn test_on_heading_nan_heading() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        drive.imu().heading.set(f64::NAN);

        assert!(!drive.on_heading(0.5, 90.0, 0.1));
        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).velocity, 0.0);
        }
    }

    #[test]
    fn test_gyro_turn_uses_turn_gain() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let max = drive.velocity_converter().max_ticks_per_s();

        drive.imu().heading.set(85.0);
        assert!(!drive.gyro_turn(1.0, 90.0));
        assert!((drive.report().steer - 0.5).abs() < 1e-9);
        assert!((drive.wheel(Wheel::FrontRight).velocity - 0.5 * max).abs() < 1e-9);

        drive.imu().heading.set(89.5);
        assert!(drive.gyro_turn(1.0, 90.0));
    }

    #[test]
    fn test_gyro_hold_completes() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        drive.imu().heading.set(10.0);

        let start = drive.clock().now.get();
        let outcome = drive.gyro_hold(0.4, 0.0, 0.25, &|| true);

        assert_eq!(outcome, HoldOutcome::Completed);
        assert!(drive.clock().now.get() - start >= Duration::from_millis(250));
        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).velocity, 0.0);
        }
        // The hold was correcting right up to the end
        assert!(drive.report().steer < 0.0);
    }

    #[test]
    fn test_gyro_hold_cancelled() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        drive.imu().heading.set(10.0);

        let polls = Cell::new(0);
        let token = || {
            polls.set(polls.get() + 1);
            polls.get() < 3
        };

        let outcome = drive.gyro_hold(0.4, 0.0, 100.0, &token);

        assert_eq!(outcome, HoldOutcome::Cancelled);
        assert_eq!(polls.get(), 3);
        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).velocity, 0.0);
        }
    }

    #[test]
    fn test_gyro_hold_zero_time() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        assert_eq!(drive.gyro_hold(0.4, 0.0, 0.0, &|| true), HoldOutcome::Completed);
        assert_eq!(drive.gyro_hold(0.4, 0.0, f64::NAN, &|| true), HoldOutcome::Completed);
    }

    #[test]
    fn test_stepped_hold() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        drive.imu().heading.set(-20.0);

        let mut hold = GyroHold::new(0.4, 0.0, 0.1);
        let mut steps = 0;
        while !hold.step(&mut drive) {
            steps += 1;
            assert!(steps < 100);
            assert!(drive.wheel(Wheel::FrontRight).velocity > 0.0);
        }

        assert!(steps > 0);
        assert_eq!(drive.wheel(Wheel::FrontRight).velocity, 0.0);
        assert!(hold.step(&mut drive));
    }

    #[test]
    fn test_on_heading_status_lines() {
        let (mut drive, lines) = fake_drive_with_lines([0; NUM_WHEELS]);

        drive.imu().heading.set(80.0);
        assert!(!drive.on_heading(0.5, 90.0, 0.05));
        assert_eq!(last_line(&lines, "Target").as_deref(), Some("90.00"));
        assert_eq!(last_line(&lines, "Err/St").as_deref(), Some("10.00/ 0.50"));

        drive.imu().heading.set(90.5);
        assert!(drive.on_heading(0.5, 90.0, 0.05));
        assert_eq!(last_line(&lines, "Err/St").as_deref(), Some("-0.50/ 0.00"));
        assert_eq!(lines.borrow().len(), 4);
    }

    #[test]
    fn test_gyro_hold_reads_clock_once_per_cycle() {
        let (mut drive, lines) = fake_drive_with_lines([0; NUM_WHEELS]);
        drive.imu().heading.set(10.0);

        // Start read at 10 ms, then one read per cycle until 100 ms have passed
        let outcome = drive.gyro_hold(0.4, 0.0, 0.1, &|| true);

        assert_eq!(outcome, HoldOutcome::Completed);
        assert_eq!(drive.clock().now.get(), Duration::from_millis(110));

        let cycles = lines.borrow().iter().filter(|(k, _)| k == "Target").count();
        assert_eq!(cycles, 9);
        assert!((drive.report().time_s - 0.11).abs() < 1e-9);
    }
}
