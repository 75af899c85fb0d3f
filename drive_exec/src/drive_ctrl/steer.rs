//! Heading error estimation and steering mixing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::{clamp, normalise_pair, wrap_deg_180};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Normalised speed demands for the two sides of the chassis, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SideSpeeds {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Signed shortest-path error from the current heading to the target.
///
/// The result lies in (-180, 180]. A positive error means the robot must turn
/// counter-clockwise (left) to reduce it.
///
/// Units: degrees
pub fn heading_error_deg(target_deg: f64, current_deg: f64) -> f64 {
    wrap_deg_180(target_deg - current_deg)
}

/// Steering correction for a heading error, clamped to [-1, 1]. Positive
/// steers left.
///
/// A NaN error (a faulty sensor reading) gives no correction.
pub fn steer(error_deg: f64, p_coeff: f64) -> f64 {
    let s = error_deg * p_coeff;

    if s.is_nan() {
        0.0
    }
    else {
        clamp(s, -1.0, 1.0)
    }
}

/// Mix a forward speed with a steering correction for straight-line driving.
///
/// When driving in reverse the correction is mirrored so that it still turns
/// the robot towards the target heading.
pub fn mix_straight(speed: f64, steer: f64, reverse: bool) -> SideSpeeds {
    let steer = if reverse { -steer } else { steer };

    let (left, right) = normalise_pair(speed - steer, speed + steer);

    SideSpeeds { left, right }
}

/// Mix a turn speed with a steering correction for a spin on the spot. The two
/// sides always run in opposite directions.
pub fn mix_turn(speed: f64, steer: f64) -> SideSpeeds {
    let right = speed * steer;

    let (left, right) = normalise_pair(-right, right);

    SideSpeeds { left, right }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heading_error() {
        assert_eq!(heading_error_deg(190.0, 0.0), -170.0);
        assert_eq!(heading_error_deg(0.0, 350.0), 10.0);
        assert_eq!(heading_error_deg(0.0, 180.0), 180.0);
        assert_eq!(heading_error_deg(-90.0, 90.0), 180.0);
        assert_eq!(heading_error_deg(45.0, 45.0), 0.0);
        assert_eq!(heading_error_deg(-170.0, 170.0), 20.0);

        let mut target = -720.0;
        while target <= 720.0 {
            let mut current = -400.0;
            while current <= 400.0 {
                let e = heading_error_deg(target, current);
                assert!(e > -180.0 && e <= 180.0);
                current += 13.7;
            }
            target += 11.3;
        }
    }

    #[test]
    fn test_steer_limits() {
        assert_eq!(steer(90.0, 0.1), 1.0);
        assert_eq!(steer(-90.0, 0.1), -1.0);
        assert!((steer(2.0, 0.15) - 0.3).abs() < 1e-12);
        assert_eq!(steer(f64::INFINITY, 0.0), 0.0);
        assert_eq!(steer(f64::NEG_INFINITY, 0.1), -1.0);

        for e in -180..=180 {
            for &g in [0.0, 0.01, 0.1, 0.15, 1.0, 10.0].iter() {
                let s = steer(e as f64, g);
                assert!(s >= -1.0 && s <= 1.0);
            }
        }
    }

    fn assert_sides(s: SideSpeeds, left: f64, right: f64) {
        assert!(
            (s.left - left).abs() < 1e-12 && (s.right - right).abs() < 1e-12,
            "expected ({}, {}), got {:?}",
            left,
            right,
            s
        );
    }

    #[test]
    fn test_mix_straight() {
        assert_sides(mix_straight(0.5, 0.2, false), 0.3, 0.7);

        // Reverse mirrors the correction
        assert_sides(mix_straight(0.5, 0.2, true), 0.7, 0.3);

        // Over-range pairs are scaled together, keeping the ratio
        let s = mix_straight(1.0, 0.5, false);
        assert!((s.left - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.right, 1.0);
    }

    #[test]
    fn test_mix_turn() {
        let s = mix_turn(0.5, steer(90.0, 0.1));
        assert_eq!(s, SideSpeeds { left: -0.5, right: 0.5 });

        assert_sides(mix_turn(0.5, steer(-5.0, 0.1)), 0.25, -0.25);
    }
}
