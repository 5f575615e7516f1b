//! Backlog-driven pacing schedule.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One pacing regime: how many steps per axis to emit per iteration, and how long to
/// pause afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingTier {
    /// Tier applies when the larger backlog is strictly greater than this.
    pub above: u32,

    /// Maximum steps drained per axis in one iteration.
    pub burst: u32,

    /// Pause after an iteration that emitted steps (microseconds).
    pub delay_us: u64,
}

impl PacingTier {
    pub const fn new(above: u32, burst: u32, delay_us: u64) -> Self {
        Self {
            above,
            burst,
            delay_us,
        }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us)
    }
}

/// Default tiers, fastest first. The last one is the resting cadence of a physical
/// encoder and also covers an empty backlog.
pub const DEFAULT_TIERS: [PacingTier; 4] = [
    PacingTier::new(200, 8, 30),
    PacingTier::new(100, 4, 50),
    PacingTier::new(50, 2, 80),
    PacingTier::new(0, 1, 120),
];

/// Ordered tier table.
///
/// Larger backlogs drain faster with shorter pauses, so the output catches up
/// without overshooting while small motions keep encoder-like timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingSchedule {
    pub tiers: Vec<PacingTier>,
}

impl Default for PacingSchedule {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.to_vec(),
        }
    }
}

impl PacingSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tier table.
    pub fn with_tiers(mut self, tiers: impl Into<Vec<PacingTier>>) -> Self {
        self.tiers = tiers.into();
        self
    }

    /// Tier for the given backlog magnitude.
    ///
    /// Picks the first tier whose threshold the backlog exceeds; the last tier is the
    /// floor for anything not claimed by a faster one.
    pub fn select(&self, max_pending: u32) -> PacingTier {
        self.tiers
            .iter()
            .find(|tier| max_pending > tier.above)
            .or_else(|| self.tiers.last())
            .copied()
            .unwrap_or(DEFAULT_TIERS[DEFAULT_TIERS.len() - 1])
    }

    /// Normalize the table to maintain safe, bounded behavior.
    ///
    /// This ensures:
    /// - At least one tier exists (defaults are restored otherwise)
    /// - Tiers are sorted by descending threshold with no duplicate thresholds
    /// - Every burst is at least one step
    pub fn normalize(&mut self) {
        if self.tiers.is_empty() {
            self.tiers = DEFAULT_TIERS.to_vec();
        }

        self.tiers.sort_by(|a, b| b.above.cmp(&a.above));
        self.tiers.dedup_by_key(|tier| tier.above);

        for tier in &mut self.tiers {
            tier.burst = tier.burst.max(1);
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.tiers.is_empty()
            && self.tiers.iter().all(|tier| tier.burst >= 1)
            && self.tiers.windows(2).all(|pair| match pair {
                [faster, slower] => faster.above > slower.above,
                _ => true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tier_selection() {
        let schedule = PacingSchedule::default();

        assert_eq!(schedule.select(250), PacingTier::new(200, 8, 30));
        assert_eq!(schedule.select(150), PacingTier::new(100, 4, 50));
        assert_eq!(schedule.select(75), PacingTier::new(50, 2, 80));
        assert_eq!(schedule.select(10), PacingTier::new(0, 1, 120));
        assert_eq!(schedule.select(0), PacingTier::new(0, 1, 120));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let schedule = PacingSchedule::default();

        assert_eq!(schedule.select(200).burst, 4);
        assert_eq!(schedule.select(201).burst, 8);
        assert_eq!(schedule.select(100).burst, 2);
        assert_eq!(schedule.select(50).burst, 1);
        assert_eq!(schedule.select(51).burst, 2);
    }

    #[test]
    fn test_tier_delay() {
        assert_eq!(DEFAULT_TIERS[0].delay(), Duration::from_micros(30));
        assert_eq!(DEFAULT_TIERS[3].delay(), Duration::from_micros(120));
    }

    #[test]
    fn test_normalize_sorts_and_fixes_bursts() {
        let mut schedule = PacingSchedule::new().with_tiers(vec![
            PacingTier::new(0, 0, 100),
            PacingTier::new(300, 16, 10),
            PacingTier::new(0, 3, 90),
        ]);
        assert!(!schedule.is_valid());

        schedule.normalize();

        assert!(schedule.is_valid());
        assert_eq!(schedule.tiers.len(), 2);
        assert_eq!(schedule.tiers[0].above, 300);
        assert_eq!(schedule.tiers[1].burst, 1);
    }

    #[test]
    fn test_normalize_restores_empty_table() {
        let mut schedule = PacingSchedule::new().with_tiers(Vec::new());
        schedule.normalize();
        assert_eq!(schedule, PacingSchedule::default());
    }

    #[test]
    fn test_single_tier_covers_everything() {
        let schedule = PacingSchedule::new().with_tiers(vec![PacingTier::new(500, 3, 40)]);
        assert_eq!(schedule.select(0).burst, 3);
        assert_eq!(schedule.select(1_000).burst, 3);
    }
}
