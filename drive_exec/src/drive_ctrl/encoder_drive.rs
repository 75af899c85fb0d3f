//! Encoder-only drive leg with independent wheel distances

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};

use super::{LegState, MecanumDrive};
use comms_if::eqpt::drive::{Actuator, HeadingSensor, NUM_WHEELS};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Moves each wheel by its own distance with no heading correction.
///
/// Opposing distances on diagonal wheels strafe (`[-12, 12, 12, -12]`),
/// opposing distances on the two sides pivot (`[12, -12, 12, -12]`).
#[derive(Debug, Clone)]
pub struct EncoderDrive {
    speed: f64,

    /// Distance for each wheel in [`Wheel::index`](comms_if::eqpt::drive::Wheel::index)
    /// order.
    ///
    /// Units: inches
    distances_in: [f64; NUM_WHEELS],

    /// Units: seconds
    timeout_s: f64,

    state: LegState,

    start_s: f64,

    targets: Option<[i32; NUM_WHEELS]>,

    timed_out: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EncoderDrive {
    pub fn new(speed: f64, distances_in: [f64; NUM_WHEELS], timeout_s: f64) -> Self {
        Self {
            speed,
            distances_in,
            timeout_s,
            state: LegState::Start,
            start_s: 0.0,
            targets: None,
            timed_out: false,
        }
    }

    pub fn state(&self) -> LegState {
        self.state
    }

    pub fn targets(&self) -> Option<[i32; NUM_WHEELS]> {
        self.targets
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Advance the leg by one control cycle. Returns `true` once stopped.
    pub fn tick<A, H, C>(&mut self, drive: &mut MecanumDrive<A, H, C>) -> bool
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
    {
        match self.state {
            LegState::Start => {
                let speed = self.speed.abs().min(1.0);
                self.targets = Some(drive.arm_position_targets(self.distances_in, speed));
                self.start_s = drive.now_s();
                self.state = LegState::Driving;

                info!(
                    "EncoderDrive started: {:?} in at {:.2}, timeout {:.1} s",
                    self.distances_in, speed, self.timeout_s
                );

                false
            },
            LegState::Driving => {
                drive.report_positions();

                let timed_out = !(drive.now_s() - self.start_s < self.timeout_s);

                if drive.all_busy() && !timed_out {
                    return false;
                }

                drive.release();
                drive.report.timed_out = timed_out;
                self.timed_out = timed_out;
                self.state = LegState::Stopped;

                if timed_out {
                    warn!("EncoderDrive timed out at {:?}", drive.positions());
                }
                else {
                    info!("EncoderDrive complete");
                }

                true
            },
            LegState::Stopped => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::state::test::fake_drive;
    use comms_if::eqpt::drive::{RunMode, Wheel};

    #[test]
    fn test_strafe_targets() {
        let mut drive = fake_drive([10, 20, 30, 40]);
        let mut leg = EncoderDrive::new(0.5, [-12.0, 12.0, 12.0, -12.0], 3.0);

        assert!(!leg.tick(&mut drive));
        assert_eq!(leg.state(), LegState::Driving);

        let t = drive.tick_converter().inches_to_ticks(12.0);
        assert_eq!(leg.targets(), Some([10 - t, 20 + t, 30 + t, 40 - t]));

        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).mode, Some(RunMode::PositionControl));
            assert!(drive.wheel(*w).velocity > 0.0);
        }
    }

    #[test]
    fn test_stops_when_wheel_done() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let mut leg = EncoderDrive::new(0.5, [12.0, -12.0, 12.0, -12.0], 3.0);
        leg.tick(&mut drive);

        for w in Wheel::ALL.iter() {
            drive.wheel_mut(*w).busy = true;
        }
        assert!(!leg.tick(&mut drive));

        drive.wheel_mut(Wheel::FrontRight).busy = false;
        assert!(leg.tick(&mut drive));
        assert!(!leg.timed_out());
        assert_eq!(drive.wheel(Wheel::RearRight).mode, Some(RunMode::VelocityControl));
        assert_eq!(drive.wheel(Wheel::RearRight).velocity, 0.0);
        assert!(leg.tick(&mut drive));
    }

    #[test]
    fn test_timeout_stops_stuck_leg() {
        let mut drive = fake_drive([0; NUM_WHEELS]);
        let mut leg = EncoderDrive::new(1.0, [48.0; NUM_WHEELS], 0.5);
        leg.tick(&mut drive);

        for w in Wheel::ALL.iter() {
            drive.wheel_mut(*w).busy = true;
        }

        let mut ticks = 0;
        while !leg.tick(&mut drive) {
            ticks += 1;
            assert!(ticks < 1000);
        }

        assert!(leg.timed_out());
        assert!(drive.report().timed_out);
        assert_eq!(leg.state(), LegState::Stopped);
        for w in Wheel::ALL.iter() {
            assert_eq!(drive.wheel(*w).velocity, 0.0);
        }
    }
}
