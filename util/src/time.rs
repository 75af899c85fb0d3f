//! General time utility functions and the clock abstraction used by timed control loops.

use chrono;
use std::time::{Duration, Instant};

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A monotonic time source.
///
/// Control loops which must run for a fixed length of time (heading holds, leg timeouts) read the
/// time through this trait so that tests can substitute a simulated clock.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed epoch. Must never decrease.
    fn now(&self) -> Duration;

    /// The same time as [`Clock::now`] but without side effects on the time source, for
    /// timestamping records. Clocks which advance when read must override this.
    fn peek(&self) -> Duration {
        self.now()
    }
}

/// Wall clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now()
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn peek(&self) -> Duration {
        (**self).peek()
    }
}

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
        assert_eq!(duration_to_seconds(chrono::Duration::max_value()), None);
    }

    #[test]
    fn test_monotonic_clock() {
        let clock = MonotonicClock::new();
        let t0 = clock.now();
        let t1 = clock.now();
        assert!(t1 >= t0);
        assert!(clock.peek() >= t1);
    }
}
