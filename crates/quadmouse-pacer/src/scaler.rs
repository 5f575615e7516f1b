//! Piecewise non-linear motion scaling.
//!
//! Small movements map 1:1 for fine control; faster flicks are multiplied in three
//! bands. The result is clamped so a single event cannot flood the backlog.

use serde::{Deserialize, Serialize};

/// Band edges and gains of the scaling law.
///
/// With `a = |delta|`:
///
/// | band                            | scaled            |
/// |---------------------------------|-------------------|
/// | `a < fine_limit`                | `a`               |
/// | `fine_limit <= a < medium_limit`| `a * medium_gain` |
/// | `medium_limit <= a < fast_limit`| `a * coarse_gain` |
/// | `a >= fast_limit`               | `a * fast_gain`   |
///
/// The signed result is clamped to `±max_event_steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScalingConfig {
    /// Upper bound (exclusive) of the 1:1 band.
    pub fine_limit: u32,
    /// Upper bound (exclusive) of the medium band.
    pub medium_limit: u32,
    /// Upper bound (exclusive) of the coarse band; anything above is fast.
    pub fast_limit: u32,
    pub medium_gain: u32,
    pub coarse_gain: u32,
    pub fast_gain: u32,
    /// Largest step count a single event may produce.
    pub max_event_steps: u32,
}

impl ScalingConfig {
    pub const DEFAULT: ScalingConfig = ScalingConfig {
        fine_limit: 4,
        medium_limit: 12,
        fast_limit: 35,
        medium_gain: 2,
        coarse_gain: 4,
        fast_gain: 6,
        max_event_steps: crate::DEFAULT_MAX_EVENT_STEPS,
    };

    /// Gain applied to a delta of the given magnitude.
    pub fn gain_for(&self, magnitude: u32) -> u32 {
        if magnitude < self.fine_limit {
            1
        } else if magnitude < self.medium_limit {
            self.medium_gain
        } else if magnitude < self.fast_limit {
            self.coarse_gain
        } else {
            self.fast_gain
        }
    }

    /// Scale a raw device delta into signed encoder steps.
    ///
    /// Total over `i32`: zero maps to zero and `i32::MIN` cannot overflow.
    pub fn scale(&self, delta: i32) -> i32 {
        let magnitude = delta.unsigned_abs();
        let scaled = u64::from(magnitude).saturating_mul(u64::from(self.gain_for(magnitude)));
        let clamped = scaled.min(u64::from(self.max_event_steps));
        let steps = i32::try_from(clamped).unwrap_or(i32::MAX);
        if delta < 0 { -steps } else { steps }
    }

    /// Normalize configuration so the law stays monotonic.
    ///
    /// This ensures:
    /// - Band edges are non-decreasing
    /// - Gains are at least 1 and non-decreasing across bands
    /// - The per-event clamp is at least 1
    pub fn normalize(&mut self) {
        self.medium_limit = self.medium_limit.max(self.fine_limit);
        self.fast_limit = self.fast_limit.max(self.medium_limit);

        self.medium_gain = self.medium_gain.max(1);
        self.coarse_gain = self.coarse_gain.max(self.medium_gain);
        self.fast_gain = self.fast_gain.max(self.coarse_gain);

        self.max_event_steps = self.max_event_steps.max(1);
    }

    pub fn is_valid(&self) -> bool {
        self.fine_limit <= self.medium_limit
            && self.medium_limit <= self.fast_limit
            && self.medium_gain >= 1
            && self.medium_gain <= self.coarse_gain
            && self.coarse_gain <= self.fast_gain
            && self.max_event_steps >= 1
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scale a delta with the default law.
#[inline]
pub fn scale_delta(delta: i32) -> i32 {
    ScalingConfig::DEFAULT.scale(delta)
}
