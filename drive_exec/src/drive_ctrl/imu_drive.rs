//! Gyro-corrected straight line drive leg

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};

// Internal
use super::{LegState, MecanumDrive, mix_straight, steer};
use comms_if::eqpt::drive::{Actuator, HeadingSensor, NUM_WHEELS};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command for a straight line drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    /// Speed magnitude, clamped to [0, 1] when the leg starts.
    pub speed: f64,

    /// Signed distance to travel, negative drives backwards.
    ///
    /// Units: inches
    pub distance_in: f64,

    /// Absolute heading to hold while driving.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// A straight line drive on wheel encoders, steered by the IMU.
///
/// Advance the leg by calling [`ImuDrive::tick`] once per control cycle until
/// it returns `true`.
#[derive(Debug, Clone)]
pub struct ImuDrive {
    cmd: DriveCommand,

    state: LegState,

    /// Clamped speed magnitude, fixed when the leg starts.
    speed: f64,

    /// Explicit timeout for this leg, overrides the parameter default.
    timeout_s: Option<f64>,

    /// Timeout resolved at start.
    active_timeout_s: Option<f64>,

    start_s: f64,

    targets: Option<[i32; NUM_WHEELS]>,

    timed_out: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ImuDrive {
    pub fn new(cmd: DriveCommand) -> Self {
        Self {
            cmd,
            state: LegState::Start,
            speed: 0.0,
            timeout_s: None,
            active_timeout_s: None,
            start_s: 0.0,
            targets: None,
            timed_out: false,
        }
    }

    /// Stop the leg after the given time even if no wheel has finished.
    pub fn with_timeout(mut self, timeout_s: f64) -> Self {
        self.timeout_s = Some(timeout_s);
        self
    }

    pub fn command(&self) -> &DriveCommand {
        &self.cmd
    }

    pub fn state(&self) -> LegState {
        self.state
    }

    /// Wheel targets, available once the leg has started.
    pub fn targets(&self) -> Option<[i32; NUM_WHEELS]> {
        self.targets
    }

    /// `true` if the leg was stopped by its timeout.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Advance the leg by one control cycle.
    ///
    /// Returns `false` while the leg is in progress and `true` once it has
    /// stopped. Ticking a stopped leg has no effect.
    pub fn tick<A, H, C>(&mut self, drive: &mut MecanumDrive<A, H, C>) -> bool
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
    {
        match self.state {
            LegState::Start => {
                self.start(drive);
                false
            },
            LegState::Driving => self.drive(drive),
            LegState::Stopped => true,
        }
    }

    fn start<A, H, C>(&mut self, drive: &mut MecanumDrive<A, H, C>)
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
    {
        let distance_in = self.cmd.distance_in;
        self.speed = self.cmd.speed.abs().min(1.0);
        self.active_timeout_s = self.timeout_s.or(drive.params().drive_timeout_s);
        self.start_s = drive.now_s();

        let distances = [distance_in; NUM_WHEELS];
        self.targets = Some(drive.arm_position_targets(distances, self.speed));

        self.state = LegState::Driving;

        info!(
            "ImuDrive started: {:.1} in at {:.2} holding {:.1} deg",
            distance_in, self.speed, self.cmd.heading_deg
        );
    }

    fn drive<A, H, C>(&mut self, drive: &mut MecanumDrive<A, H, C>) -> bool
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
    {
        let timed_out = match self.active_timeout_s {
            Some(t) => !(drive.now_s() - self.start_s < t),
            None => false,
        };

        if !drive.all_busy() || timed_out {
            self.stop(drive, timed_out);
            return true;
        }

        let error = drive.measure_heading_error(self.cmd.heading_deg);
        let steer = steer(error, drive.params().p_drive_coeff);
        drive.report.steer = steer;

        let speeds = mix_straight(self.speed, steer, self.cmd.distance_in < 0.0);
        drive.set_side_speeds(speeds);

        drive.report_positions();
        drive.status("Err/St", &format!("{:5.1}/{:5.2}", error, steer));
        drive.status("Speed", &format!("{:5.2}:{:5.2}", speeds.left, speeds.right));

        false
    }

    fn stop<A, H, C>(&mut self, drive: &mut MecanumDrive<A, H, C>, timed_out: bool)
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
    {
        drive.release();
        drive.report_positions();
        drive.report.timed_out = timed_out;

        self.timed_out = timed_out;
        self.state = LegState::Stopped;

        if timed_out {
            warn!(
                "ImuDrive timed out after {:.2} s with wheels at {:?}",
                drive.report().time_s - self.start_s,
                drive.positions()
            );
        }
        else {
            info!("ImuDrive complete");
        }
        debug!("ImuDrive final targets {:?}", self.targets);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::state::test::{fake_drive, fake_drive_with_lines, last_line, FakeDrive};
    use comms_if::eqpt::drive::{RunMode, Wheel};

    fn set_busy(drive: &mut FakeDrive, busy: bool) {
        for w in Wheel::ALL.iter() {
            drive.wheel_mut(*w).busy = busy;
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_start_sets_targets() {
        let mut drive = fake_drive([100, -50, 0, 7]);
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        });
        assert_eq!(leg.state(), LegState::Start);
        assert_eq!(leg.targets(), None);

        assert!(!leg.tick(&mut drive));
        assert_eq!(leg.state(), LegState::Driving);

        let offset = (48.0 * drive.tick_converter().counts_per_inch()).round() as i32;
        assert_eq!(offset, 2054);
        assert_eq!(leg.targets(), Some([2154, 2004, 2054, 2061]));

        let max = drive.velocity_converter().max_ticks_per_s();
        for w in Wheel::ALL.iter() {
            let wheel = drive.wheel(*w);
            assert_eq!(wheel.mode, Some(RunMode::PositionControl));
            assert_eq!(wheel.target, Some(wheel.position + offset));
            assert_close(wheel.velocity, 0.5 * max);
        }
        assert_eq!(drive.report().fl_target, 2154);
    }

    #[test]
    fn test_speed_clamped() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let max = drive.velocity_converter().max_ticks_per_s();

        let mut leg = ImuDrive::new(DriveCommand {
            speed: 1.7,
            distance_in: 12.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        assert_close(drive.wheel(Wheel::RearRight).velocity, max);

        let mut leg = ImuDrive::new(DriveCommand {
            speed: -0.25,
            distance_in: 12.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        assert_close(drive.wheel(Wheel::RearRight).velocity, 0.25 * max);
    }

    #[test]
    fn test_heading_correction() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let max = drive.velocity_converter().max_ticks_per_s();
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        set_busy(&mut drive, true);

        // 2 degrees right of target, steer 0.3 to the left
        drive.imu().heading.set(-2.0);
        assert!(!leg.tick(&mut drive));
        assert_eq!(leg.state(), LegState::Driving);
        assert_close(drive.report().steer, 0.3);
        assert_close(drive.wheel(Wheel::FrontLeft).velocity, 0.2 * max);
        assert_close(drive.wheel(Wheel::RearLeft).velocity, 0.2 * max);
        assert_close(drive.wheel(Wheel::FrontRight).velocity, 0.8 * max);
        assert_close(drive.wheel(Wheel::RearRight).velocity, 0.8 * max);
    }

    #[test]
    fn test_reverse_flips_correction() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let max = drive.velocity_converter().max_ticks_per_s();
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: -24.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        assert_eq!(leg.targets(), Some([-1027; NUM_WHEELS]));
        set_busy(&mut drive, true);

        drive.imu().heading.set(-2.0);
        leg.tick(&mut drive);
        assert_close(drive.wheel(Wheel::FrontLeft).velocity, 0.8 * max);
        assert_close(drive.wheel(Wheel::FrontRight).velocity, 0.2 * max);
    }

    #[test]
    fn test_stops_when_any_wheel_done() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        set_busy(&mut drive, true);
        assert!(!leg.tick(&mut drive));

        drive.wheel_mut(Wheel::RearLeft).busy = false;
        assert!(leg.tick(&mut drive));
        assert_eq!(leg.state(), LegState::Stopped);
        assert!(!leg.timed_out());

        let mut commands = [0usize; NUM_WHEELS];
        for w in Wheel::ALL.iter() {
            let wheel = drive.wheel(*w);
            assert_eq!(wheel.velocity, 0.0);
            assert_eq!(wheel.mode, Some(RunMode::VelocityControl));
            commands[w.index()] = wheel.commands;
        }

        // Stopped is terminal and has no further side effects
        drive.imu().heading.set(45.0);
        for _ in 0..3 {
            assert!(leg.tick(&mut drive));
        }
        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).commands, commands[w.index()]);
        }
        assert_eq!(leg.state(), LegState::Stopped);
    }

    #[test]
    fn test_timeout() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        })
        .with_timeout(0.2);
        leg.tick(&mut drive);
        set_busy(&mut drive, true);

        let mut done = false;
        for _ in 0..100 {
            if leg.tick(&mut drive) {
                done = true;
                break;
            }
        }

        assert!(done);
        assert!(leg.timed_out());
        assert!(drive.report().timed_out);
        assert_eq!(drive.wheel(Wheel::FrontLeft).mode, Some(RunMode::VelocityControl));
    }

    #[test]
    fn test_no_timeout_by_default() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        set_busy(&mut drive, true);

        for _ in 0..500 {
            assert!(!leg.tick(&mut drive));
        }
    }

    #[test]
    fn test_status_lines() {
        let (mut drive, lines) = fake_drive_with_lines([100, -50, 0, 7]);
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        });
        leg.tick(&mut drive);
        set_busy(&mut drive, true);

        drive.wheel_mut(Wheel::FrontLeft).position = 600;
        drive.imu().heading.set(-2.0);
        leg.tick(&mut drive);

        assert_eq!(
            last_line(&lines, "Running to").as_deref(),
            Some("   2154 :   2004 :   2054 :   2061")
        );
        assert_eq!(
            last_line(&lines, "Running at").as_deref(),
            Some("    600 :    -50 :      0 :      7")
        );
        assert_eq!(last_line(&lines, "Err/St").as_deref(), Some("  2.0/ 0.30"));
        assert_eq!(last_line(&lines, "Speed").as_deref(), Some(" 0.20: 0.80"));

        // Heading recovered, the error line follows it
        drive.imu().heading.set(0.0);
        leg.tick(&mut drive);
        assert_eq!(last_line(&lines, "Err/St").as_deref(), Some("  0.0/ 0.00"));
    }

    #[test]
    fn test_timeout_reported_from_leg_clock() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let mut leg = ImuDrive::new(DriveCommand {
            speed: 0.5,
            distance_in: 48.0,
            heading_deg: 0.0,
        })
        .with_timeout(0.045);
        leg.tick(&mut drive);
        set_busy(&mut drive, true);

        // One clock read per tick: start at 10 ms, then 20, 30, 40, 50, 60 ms
        let mut ticks = 0;
        while !leg.tick(&mut drive) {
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert!(leg.timed_out());
        assert_close(drive.report().time_s, drive.clock().peek().as_secs_f64());
    }
}
