//! In-memory port implementations for tests and examples.

use crate::cancel::CancellationToken;
use crate::error::{PacerError, PacerResult};
use crate::events::{Axis, MouseEvent};
use crate::ports::{EventSource, Level, OutputBank, OutputLine, Sleeper};
use crate::quadrature::Pattern;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Output bank that records every write.
#[derive(Debug, Clone)]
pub struct MockOutputBank {
    levels: BTreeMap<OutputLine, Level>,
    history: Vec<(OutputLine, Level)>,
    fail_after: Option<usize>,
}

impl MockOutputBank {
    /// All lines start at the idle level.
    pub fn new() -> Self {
        Self {
            levels: OutputLine::ALL
                .iter()
                .map(|&line| (line, Level::IDLE))
                .collect(),
            history: Vec::new(),
            fail_after: None,
        }
    }

    /// Bank whose writes start failing once `writes` have succeeded.
    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::new()
        }
    }

    /// Stop injecting failures.
    pub fn heal(&mut self) {
        self.fail_after = None;
    }

    pub fn level(&self, line: OutputLine) -> Level {
        self.levels.get(&line).copied().unwrap_or(Level::IDLE)
    }

    pub fn history(&self) -> &[(OutputLine, Level)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn all_idle(&self) -> bool {
        self.levels.values().all(|level| *level == Level::IDLE)
    }

    /// Axis patterns sampled after each phase-B write.
    ///
    /// Channels always drive phase A then phase B, so each sample is one complete
    /// encoder state.
    pub fn patterns(&self, axis: Axis) -> Vec<Pattern> {
        let (line_a, line_b) = OutputLine::phase_lines(axis);
        let mut a = Level::IDLE;
        let mut samples = Vec::new();
        for &(line, level) in &self.history {
            if line == line_a {
                a = level;
            } else if line == line_b {
                samples.push((a, level));
            }
        }
        samples
    }

    /// Number of sampled patterns that differ from the one before, starting from the
    /// idle pattern.
    pub fn transitions(&self, axis: Axis) -> usize {
        let mut previous = (Level::IDLE, Level::IDLE);
        let mut count = 0;
        for pattern in self.patterns(axis) {
            if pattern != previous {
                count += 1;
            }
            previous = pattern;
        }
        count
    }

    /// Writes addressed to the button line.
    pub fn button_writes(&self) -> Vec<Level> {
        self.history
            .iter()
            .filter(|(line, _)| *line == OutputLine::Button)
            .map(|(_, level)| *level)
            .collect()
    }
}

impl Default for MockOutputBank {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBank for MockOutputBank {
    fn write(&mut self, line: OutputLine, level: Level) -> PacerResult<()> {
        if let Some(remaining) = self.fail_after {
            if remaining == 0 {
                return Err(PacerError::output(line, "injected failure"));
            }
            self.fail_after = Some(remaining - 1);
        }

        self.levels.insert(line, level);
        self.history.push((line, level));
        Ok(())
    }
}

/// Event source fed from queued batches.
///
/// Each readiness check that finds a queued batch reports ready; the next
/// `drain` hands that whole batch over.
#[derive(Debug, Default)]
pub struct MockEventSource {
    batches: VecDeque<Vec<MouseEvent>>,
    polls: usize,
    waits: Vec<Duration>,
    released: usize,
    cancel_after: Option<(usize, CancellationToken)>,
    arrivals: Vec<(usize, Vec<MouseEvent>)>,
    fail_on_drain: bool,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, batch: Vec<MouseEvent>) {
        self.batches.push_back(batch);
    }

    /// Cancel `token` on the `polls`-th readiness check.
    pub fn cancel_after(&mut self, polls: usize, token: CancellationToken) {
        self.cancel_after = Some((polls, token));
    }

    /// Queue `batch` so it becomes readable during the `polls`-th readiness check.
    pub fn arrive_on_wait(&mut self, polls: usize, batch: Vec<MouseEvent>) {
        self.arrivals.push((polls, batch));
    }

    /// Make the next drain report a disconnect.
    pub fn fail_on_drain(&mut self) {
        self.fail_on_drain = true;
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Timeouts passed to `wait_ready`, in call order.
    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }

    pub fn release_count(&self) -> usize {
        self.released
    }

    pub fn is_released(&self) -> bool {
        self.released > 0
    }

    pub fn pending_batches(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for MockEventSource {
    fn wait_ready(&mut self, timeout: Duration) -> PacerResult<bool> {
        self.polls += 1;
        self.waits.push(timeout);
        let polls = self.polls;
        let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.arrivals)
            .into_iter()
            .partition(|(at, _)| *at <= polls);
        self.arrivals = later;
        self.batches.extend(due.into_iter().map(|(_, batch)| batch));
        if let Some((after, token)) = &self.cancel_after {
            if self.polls >= *after {
                token.cancel();
            }
        }
        Ok(!self.batches.is_empty() || self.fail_on_drain)
    }

    fn drain(&mut self, events: &mut Vec<MouseEvent>) -> PacerResult<usize> {
        if self.fail_on_drain {
            return Err(PacerError::Disconnected);
        }
        let batch = self.batches.pop_front().unwrap_or_default();
        let count = batch.len();
        events.extend(batch);
        Ok(count)
    }

    fn release(&mut self) -> PacerResult<()> {
        self.released += 1;
        Ok(())
    }
}

/// Sleeper that records requested durations without waiting.
#[derive(Debug, Clone, Default)]
pub struct ManualSleeper {
    requested: Vec<Duration>,
}

impl ManualSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> &[Duration] {
        &self.requested
    }

    pub fn total(&self) -> Duration {
        self.requested.iter().sum()
    }
}

impl Sleeper for ManualSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.requested.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_failure_injection() {
        let mut bank = MockOutputBank::failing_after(1);
        assert!(bank.write(OutputLine::XA, Level::Low).is_ok());
        assert!(bank.write(OutputLine::XB, Level::Low).is_err());
        assert_eq!(bank.history().len(), 1);

        bank.heal();
        assert!(bank.write(OutputLine::XB, Level::Low).is_ok());
    }

    #[test]
    fn test_patterns_sample_on_phase_b() {
        let mut bank = MockOutputBank::new();
        for (line, level) in [
            (OutputLine::XA, Level::Low),
            (OutputLine::XB, Level::High),
            (OutputLine::YA, Level::Low),
            (OutputLine::XA, Level::Low),
            (OutputLine::XB, Level::Low),
        ] {
            assert!(bank.write(line, level).is_ok());
        }

        assert_eq!(
            bank.patterns(Axis::X),
            vec![(Level::Low, Level::High), (Level::Low, Level::Low)]
        );
        assert_eq!(bank.transitions(Axis::X), 2);
        assert!(bank.patterns(Axis::Y).is_empty());
    }

    #[test]
    fn test_source_hands_over_batches() -> PacerResult<()> {
        let mut source = MockEventSource::new();
        assert!(!source.wait_ready(Duration::ZERO)?);

        source.push_batch(vec![MouseEvent::button(true), MouseEvent::motion(Axis::X, 4)]);
        assert!(source.wait_ready(Duration::ZERO)?);

        let mut events = Vec::new();
        assert_eq!(source.drain(&mut events)?, 2);
        assert_eq!(events.len(), 2);
        assert!(!source.wait_ready(Duration::ZERO)?);
        assert_eq!(source.polls(), 3);
        Ok(())
    }
}
