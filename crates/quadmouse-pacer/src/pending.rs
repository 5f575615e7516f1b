//! Bounded per-axis backlog of owed encoder steps.

use crate::events::Direction;

/// Signed count of steps owed to one axis.
///
/// The count stays within `±limit` after every accumulation; draining moves it toward
/// zero one step at a time and never past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSteps {
    count: i32,
    limit: i32,
}

impl PendingSteps {
    pub fn new(limit: u32) -> Self {
        Self {
            count: 0,
            limit: i32::try_from(limit).unwrap_or(i32::MAX),
        }
    }

    #[inline]
    pub fn count(&self) -> i32 {
        self.count
    }

    #[inline]
    pub fn magnitude(&self) -> u32 {
        self.count.unsigned_abs()
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit.unsigned_abs()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add scaled steps and clamp. Returns `true` if the backlog was truncated.
    pub fn accumulate(&mut self, steps: i32) -> bool {
        self.count = self.count.saturating_add(steps);
        self.clamp()
    }

    /// Clamp to `±limit`. Returns `true` if anything was discarded.
    pub fn clamp(&mut self) -> bool {
        let clamped = self.count.clamp(-self.limit, self.limit);
        let truncated = clamped != self.count;
        self.count = clamped;
        truncated
    }

    /// Consume one owed step, returning its direction.
    pub fn take_step(&mut self) -> Option<Direction> {
        let direction = Direction::of(self.count)?;
        self.count -= direction.delta();
        Some(direction)
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}

impl Default for PendingSteps {
    fn default() -> Self {
        Self::new(crate::DEFAULT_QUEUE_LIMIT)
    }
}
