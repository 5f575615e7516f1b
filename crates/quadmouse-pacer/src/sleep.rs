//! High-precision short sleeps for the pacing loop.

use crate::ports::Sleeper;
use std::time::{Duration, Instant};

/// Below this, the whole wait is busy-spun.
const SPIN_ONLY_BELOW: Duration = Duration::from_micros(100);

/// Tail of a longer wait that is busy-spun after the OS sleep returns.
const SPIN_TAIL: Duration = Duration::from_micros(80);

/// Sleeper with a busy-spin tail.
///
/// OS sleeps overshoot by tens of microseconds, which is the same order as the
/// pacing delays themselves. Short waits are spun outright; longer ones sleep until
/// just before the deadline and spin the remainder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionSleeper;

impl PrecisionSleeper {
    pub fn new() -> Self {
        Self
    }

    /// Wait until `target`.
    pub fn sleep_until(&mut self, target: Instant) {
        let now = Instant::now();
        if target <= now {
            return;
        }

        let duration = target.duration_since(now);
        if duration >= SPIN_ONLY_BELOW {
            std::thread::sleep(duration.saturating_sub(SPIN_TAIL));
        }

        while Instant::now() < target {
            std::hint::spin_loop();
        }
    }
}

impl Sleeper for PrecisionSleeper {
    fn sleep(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.sleep_until(Instant::now() + duration);
    }
}
