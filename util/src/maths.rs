//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range `[min, max]`.
///
/// NaN is passed through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the half-open interval (-180, 180].
///
/// Any finite input maps into the interval, however many turns away from it
/// the input is.
pub fn wrap_deg_180<T>(angle_deg: T) -> T
where
    T: Float
{
    let full = T::from(360.0).unwrap();
    let half = T::from(180.0).unwrap();

    let mut a = rem_euclid(angle_deg, full);

    // Round-off in rem_euclid can give exactly 360
    if a >= full {
        a = a - full;
    }

    if a > half {
        a - full
    }
    else {
        a
    }
}

/// Scale a pair of normalised demands down so that neither magnitude exceeds
/// 1, preserving their ratio.
///
/// Pairs already within range are returned untouched, so there is never a
/// division by a value of 1 or less.
pub fn normalise_pair<T>(a: T, b: T) -> (T, T)
where
    T: Float
{
    let max = a.abs().max(b.abs());

    if max > T::one() {
        (a / max, b / max)
    }
    else {
        (a, b)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(9.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-3.5, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25, -1.0, 1.0), 0.25);
        assert!(clamp(f64::NAN, -1.0, 1.0).is_nan());
    }

    #[test]
    fn test_wrap_deg_180() {
        assert_eq!(wrap_deg_180(190.0), -170.0);
        assert_eq!(wrap_deg_180(-350.0), 10.0);
        assert_eq!(wrap_deg_180(180.0), 180.0);
        assert_eq!(wrap_deg_180(-180.0), 180.0);
        assert_eq!(wrap_deg_180(540.0), 180.0);
        assert_eq!(wrap_deg_180(0.0), 0.0);
        assert_eq!(wrap_deg_180(-90.0), -90.0);
        assert_eq!(wrap_deg_180(7200.0 + 45.0), 45.0);

        // Sweep a wide range and check the interval always holds
        let mut a = -2000.0;
        while a < 2000.0 {
            let w = wrap_deg_180(a);
            assert!(w > -180.0 && w <= 180.0, "{} wrapped to {}", a, w);
            a += 0.37;
        }
    }

    #[test]
    fn test_normalise_pair() {
        assert_eq!(normalise_pair(0.5, -0.25), (0.5, -0.25));
        assert_eq!(normalise_pair(1.0, 1.0), (1.0, 1.0));
        assert_eq!(normalise_pair(2.0, 1.0), (1.0, 0.5));
        assert_eq!(normalise_pair(-0.5, -4.0), (-0.125, -1.0));
        assert_eq!(normalise_pair(0.0, 0.0), (0.0, 0.0));
    }
}
