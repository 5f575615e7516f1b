//! Counters collected by the pacing loop.

use crate::events::Axis;

/// Running totals for one pacer session.
///
/// Plain integer fields: the loop is single-threaded and the snapshot is only read
/// after it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacerStats {
    /// Loop iterations executed.
    pub iterations: u64,
    /// Encoder steps emitted on X.
    pub steps_x: u64,
    /// Encoder steps emitted on Y.
    pub steps_y: u64,
    /// Iterations that checked the input device.
    pub polls: u64,
    /// Polls that found nothing to read.
    pub idle_polls: u64,
    /// Events decoded from the device.
    pub events: u64,
    /// Motion events discarded by the deadzone.
    pub deadzone_drops: u64,
    /// Times a backlog was cut back to the queue limit.
    pub truncations: u64,
    /// Button transitions relayed.
    pub button_changes: u64,
}

impl PacerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self, axis: Axis) -> u64 {
        match axis {
            Axis::X => self.steps_x,
            Axis::Y => self.steps_y,
        }
    }

    pub(crate) fn record_steps(&mut self, axis: Axis, steps: u32) {
        let counter = match axis {
            Axis::X => &mut self.steps_x,
            Axis::Y => &mut self.steps_y,
        };
        *counter = counter.saturating_add(u64::from(steps));
    }

    pub fn total_steps(&self) -> u64 {
        self.steps_x.saturating_add(self.steps_y)
    }

    /// Fraction of polls that found no input, in `[0.0, 1.0]`.
    pub fn idle_poll_rate(&self) -> f64 {
        if self.polls == 0 {
            return 0.0;
        }
        self.idle_polls as f64 / self.polls as f64
    }
}
