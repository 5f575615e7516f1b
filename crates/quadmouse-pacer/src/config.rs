//! Pacer tuning configuration.

use crate::pacing::PacingSchedule;
use crate::scaler::ScalingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning constants of the motion-to-quadrature engine.
///
/// Every field has a default, so a partial JSON document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacerConfig {
    /// Raw deltas with a smaller magnitude are discarded as jitter.
    pub deadzone: u32,

    /// Per-axis backlog ceiling, in steps.
    pub queue_limit: u32,

    /// Flip the Y axis. Device Y grows downward, encoder Y grows upward.
    pub invert_y: bool,

    /// How long an idle input check blocks on the device waiting for events
    /// (microseconds). Zero makes every idle check non-blocking.
    pub idle_backoff_us: u64,

    /// Motion scaling law.
    pub scaling: ScalingConfig,

    /// Backlog-driven pacing tiers.
    pub schedule: PacingSchedule,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            deadzone: crate::DEFAULT_DEADZONE,
            queue_limit: crate::DEFAULT_QUEUE_LIMIT,
            invert_y: true,
            idle_backoff_us: crate::DEFAULT_IDLE_BACKOFF_US,
            scaling: ScalingConfig::default(),
            schedule: PacingSchedule::default(),
        }
    }
}

impl PacerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadzone(mut self, deadzone: u32) -> Self {
        self.deadzone = deadzone;
        self
    }

    pub fn with_queue_limit(mut self, limit: u32) -> Self {
        self.queue_limit = limit;
        self
    }

    pub fn with_invert_y(mut self, invert: bool) -> Self {
        self.invert_y = invert;
        self
    }

    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff_us = u64::try_from(backoff.as_micros()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_scaling(mut self, scaling: ScalingConfig) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_schedule(mut self, schedule: PacingSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    #[inline]
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_micros(self.idle_backoff_us)
    }

    /// Normalize the configuration so the loop stays bounded.
    ///
    /// The per-event clamp and the queue limit are deliberately independent: a
    /// run of events may still fill the queue well past one event's worth.
    pub fn normalize(&mut self) {
        self.queue_limit = self.queue_limit.max(1);
        self.scaling.normalize();
        self.schedule.normalize();
    }

    pub fn is_valid(&self) -> bool {
        self.queue_limit >= 1 && self.scaling.is_valid() && self.schedule.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PacerConfig::default();
        assert_eq!(config.deadzone, 2);
        assert_eq!(config.queue_limit, 300);
        assert!(config.invert_y);
        assert_eq!(config.scaling.max_event_steps, 50);
        assert_eq!(config.schedule.tiers.len(), 4);
        assert!(config.is_valid());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PacerConfig::new()
            .with_deadzone(5)
            .with_queue_limit(120)
            .with_invert_y(false)
            .with_idle_backoff(Duration::ZERO);

        assert_eq!(config.deadzone, 5);
        assert_eq!(config.queue_limit, 120);
        assert!(!config.invert_y);
        assert_eq!(config.idle_backoff(), Duration::ZERO);
    }

    #[test]
    fn test_normalize_zero_queue() {
        let mut config = PacerConfig::new().with_queue_limit(0);
        assert!(!config.is_valid());
        config.normalize();
        assert_eq!(config.queue_limit, 1);
        assert!(config.is_valid());
    }
}
