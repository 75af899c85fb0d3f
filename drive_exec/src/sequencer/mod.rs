//! # Leg sequencer
//!
//! Runs a script of legs in order, one control cycle at a time. Each leg is
//! preceded by its scripted pause, and the first leg additionally by the start
//! delay chosen in the autonomous configuration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use log::{info, warn};
use serde::Serialize;

use crate::drive_ctrl::{DriveCommand, EncoderDrive, GyroHold, ImuDrive, MecanumDrive};
use comms_if::{
    eqpt::drive::{Actuator, ActiveToken, HeadingSensor},
    tc::leg::LegCmd,
};
use util::{script_interpreter::ScriptedLeg, time::Clock};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Status of the sequencer after a step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum SeqStatus {
    /// Waiting before the next leg starts.
    Pausing,

    /// A leg is in progress.
    Running,

    /// Every leg has completed. Terminal.
    Finished,

    /// The active token went false, the drivetrain was stopped and any
    /// remaining legs abandoned. Terminal.
    Cancelled,
}

enum ActiveLeg {
    Drive(ImuDrive),
    Encoder(EncoderDrive),
    Turn { speed: f64, heading_deg: f64 },
    Hold(GyroHold),
    Stop,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct LegSequencer {
    pending: VecDeque<ScriptedLeg>,

    current: Option<ActiveLeg>,

    /// Clock time at which the next pending leg may start, set when its pause
    /// begins.
    next_start_s: Option<f64>,

    /// Units: seconds
    start_delay_s: f64,

    legs_done: usize,

    status: SeqStatus,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LegSequencer {
    pub fn new<I>(legs: I) -> Self
    where
        I: IntoIterator<Item = ScriptedLeg>,
    {
        let pending: VecDeque<ScriptedLeg> = legs.into_iter().collect();

        let status = if pending.is_empty() {
            SeqStatus::Finished
        } else {
            SeqStatus::Pausing
        };

        Self {
            pending,
            current: None,
            next_start_s: None,
            start_delay_s: 0.0,
            legs_done: 0,
            status,
        }
    }

    /// Wait this long, in addition to its own pause, before the first leg.
    pub fn with_start_delay(mut self, delay_s: f64) -> Self {
        self.start_delay_s = delay_s.max(0.0);
        self
    }

    pub fn status(&self) -> SeqStatus {
        self.status
    }

    pub fn legs_done(&self) -> usize {
        self.legs_done
    }

    /// Legs not yet started.
    pub fn legs_remaining(&self) -> usize {
        self.pending.len()
    }

    /// Advance the sequence by one control cycle.
    pub fn step<A, H, C, T>(
        &mut self,
        drive: &mut MecanumDrive<A, H, C>,
        active: &T,
    ) -> SeqStatus
    where
        A: Actuator,
        H: HeadingSensor,
        C: Clock,
        T: ActiveToken + ?Sized,
    {
        match self.status {
            SeqStatus::Finished | SeqStatus::Cancelled => return self.status,
            _ => (),
        }

        if !active.is_active() {
            drive.release();
            warn!(
                "Leg sequence cancelled after {} legs, abandoning {} more",
                self.legs_done,
                self.pending.len() + self.current.is_some() as usize
            );
            self.pending.clear();
            self.current = None;
            self.status = SeqStatus::Cancelled;
            return self.status;
        }

        if self.current.is_none() {
            let leg = match self.pending.front() {
                Some(l) => *l,
                None => {
                    self.status = SeqStatus::Finished;
                    return self.status;
                }
            };

            let now_s = drive.now_s();
            let delay_s = if self.legs_done == 0 { self.start_delay_s } else { 0.0 };
            let start_s = *self.next_start_s.get_or_insert(now_s + leg.pause_s + delay_s);

            if now_s < start_s {
                self.status = SeqStatus::Pausing;
                return self.status;
            }

            self.pending.pop_front();
            self.next_start_s = None;
            self.current = Some(Self::activate(leg.leg));

            info!("Starting leg {}: {:?}", self.legs_done + 1, leg.leg);
        }

        let done = match self.current {
            Some(ActiveLeg::Drive(ref mut l)) => l.tick(drive),
            Some(ActiveLeg::Encoder(ref mut l)) => l.tick(drive),
            Some(ActiveLeg::Turn { speed, heading_deg }) => drive.gyro_turn(speed, heading_deg),
            Some(ActiveLeg::Hold(ref mut l)) => l.step(drive),
            Some(ActiveLeg::Stop) => {
                drive.release();
                true
            },
            None => false,
        };

        self.status = SeqStatus::Running;

        if done {
            self.current = None;
            self.legs_done += 1;

            info!("Leg {} complete", self.legs_done);

            if self.pending.is_empty() {
                info!("Leg sequence finished");
                self.status = SeqStatus::Finished;
            }
        }

        self.status
    }

    fn activate(cmd: LegCmd) -> ActiveLeg {
        match cmd {
            LegCmd::Drive {
                speed,
                distance_in,
                heading_deg,
                timeout_s,
            } => {
                let leg = ImuDrive::new(DriveCommand {
                    speed,
                    distance_in,
                    heading_deg,
                });
                ActiveLeg::Drive(match timeout_s {
                    Some(t) => leg.with_timeout(t),
                    None => leg,
                })
            },
            LegCmd::Turn { speed, heading_deg } => ActiveLeg::Turn { speed, heading_deg },
            LegCmd::Hold {
                speed,
                heading_deg,
                hold_s,
            } => ActiveLeg::Hold(GyroHold::new(speed, heading_deg, hold_s)),
            LegCmd::Encoder {
                speed,
                distances_in,
                timeout_s,
            } => ActiveLeg::Encoder(EncoderDrive::new(speed, distances_in, timeout_s)),
            LegCmd::Stop => ActiveLeg::Stop,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
