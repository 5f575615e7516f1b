//! The pacing loop.
//!
//! One [`Pacer`] owns all per-axis state. Each iteration it clamps both backlogs,
//! picks a tier from the larger one, drains X then Y by up to that tier's burst, and
//! either pauses (if anything moved) or checks the input device (if nothing did).
//! An idle check that finds nothing waits on the device itself for up to the idle
//! backoff, so input arriving during that wait is picked up immediately.

use crate::button::ButtonRelay;
use crate::cancel::CancellationToken;
use crate::config::PacerConfig;
use crate::error::PacerResult;
use crate::events::{Axis, MouseEvent};
use crate::pacing::PacingTier;
use crate::pending::PendingSteps;
use crate::ports::{EventSource, OutputBank, Sleeper};
use crate::quadrature::{Phase, QuadratureChannel};
use crate::stats::PacerStats;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Initial capacity of the reusable event batch.
const BATCH_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct AxisState {
    channel: QuadratureChannel,
    pending: PendingSteps,
}

impl AxisState {
    fn new(axis: Axis, queue_limit: u32) -> Self {
        Self {
            channel: QuadratureChannel::new(axis),
            pending: PendingSteps::new(queue_limit),
        }
    }

    /// Emit up to `burst` owed steps. Stops early once the backlog is empty.
    fn drain<O: OutputBank + ?Sized>(&mut self, burst: u32, output: &mut O) -> PacerResult<u32> {
        let mut steps = 0;
        while steps < burst {
            let Some(direction) = self.pending.take_step() else {
                break;
            };
            self.channel.advance(direction, output)?;
            steps += 1;
        }
        Ok(steps)
    }

    fn reset(&mut self) {
        self.channel.reset();
        self.pending.clear();
    }
}

/// What a single loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Tier selected from the backlog at the start of the iteration.
    pub tier: PacingTier,
    pub steps_x: u32,
    pub steps_y: u32,
    /// Whether the input device was checked this iteration.
    pub polled: bool,
    /// Events read from the device this iteration.
    pub events: usize,
}

impl TickOutcome {
    /// Whether any encoder step was emitted.
    #[inline]
    pub fn did_step(&self) -> bool {
        self.steps_x > 0 || self.steps_y > 0
    }

    pub fn steps(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.steps_x,
            Axis::Y => self.steps_y,
        }
    }
}

/// Motion-to-quadrature engine.
///
/// Output is owned; the event source and sleeper are borrowed per call so the
/// caller keeps them for teardown and inspection.
pub struct Pacer<O: OutputBank> {
    config: PacerConfig,
    x: AxisState,
    y: AxisState,
    button: ButtonRelay,
    output: O,
    stats: PacerStats,
    batch: Vec<MouseEvent>,
}

impl<O: OutputBank> Pacer<O> {
    /// Create a pacer. The configuration is normalized first.
    pub fn new(mut config: PacerConfig, output: O) -> Self {
        config.normalize();
        let limit = config.queue_limit;
        Self {
            config,
            x: AxisState::new(Axis::X, limit),
            y: AxisState::new(Axis::Y, limit),
            button: ButtonRelay::new(),
            output,
            stats: PacerStats::new(),
            batch: Vec::with_capacity(BATCH_CAPACITY),
        }
    }

    /// Drive the initial state: both channels at phase 0, button released.
    pub fn start(&mut self) -> PacerResult<()> {
        self.x.channel.emit(&mut self.output)?;
        self.y.channel.emit(&mut self.output)?;
        self.button.relay(&mut self.output, false)
    }

    /// Apply one decoded event.
    ///
    /// Motion goes through the deadzone, Y inversion and scaling into the backlog;
    /// button changes are written to the output immediately.
    pub fn feed(&mut self, event: MouseEvent) -> PacerResult<()> {
        self.stats.events += 1;
        match event {
            MouseEvent::Motion { axis, delta } => {
                self.accumulate(axis, delta);
                Ok(())
            }
            MouseEvent::Button { pressed } => {
                self.stats.button_changes += 1;
                trace!(pressed, "button relayed");
                self.button.relay(&mut self.output, pressed)
            }
        }
    }

    fn accumulate(&mut self, axis: Axis, delta: i32) {
        if delta.unsigned_abs() < self.config.deadzone {
            self.stats.deadzone_drops += 1;
            return;
        }

        let delta = if axis == Axis::Y && self.config.invert_y {
            delta.saturating_neg()
        } else {
            delta
        };
        let steps = self.config.scaling.scale(delta);

        if self.axis_mut(axis).pending.accumulate(steps) {
            self.stats.truncations += 1;
            debug!(%axis, limit = self.config.queue_limit, "backlog truncated");
        }
    }

    /// Run one loop iteration.
    ///
    /// # Errors
    ///
    /// Returns the first output or input failure; the iteration is abandoned at that
    /// point and the caller is expected to tear down.
    pub fn tick<S, Sl>(&mut self, source: &mut S, sleeper: &mut Sl) -> PacerResult<TickOutcome>
    where
        S: EventSource + ?Sized,
        Sl: Sleeper + ?Sized,
    {
        self.stats.iterations += 1;

        for axis in Axis::ALL {
            if self.axis_mut(axis).pending.clamp() {
                self.stats.truncations += 1;
            }
        }

        let max_pending = self.x.pending.magnitude().max(self.y.pending.magnitude());
        let tier = self.config.schedule.select(max_pending);

        let steps_x = self.x.drain(tier.burst, &mut self.output)?;
        let steps_y = self.y.drain(tier.burst, &mut self.output)?;
        self.stats.record_steps(Axis::X, steps_x);
        self.stats.record_steps(Axis::Y, steps_y);

        let mut outcome = TickOutcome {
            tier,
            steps_x,
            steps_y,
            polled: false,
            events: 0,
        };

        if outcome.did_step() {
            sleeper.sleep(tier.delay());
            return Ok(outcome);
        }

        outcome.polled = true;
        outcome.events = self.poll_input(source)?;
        Ok(outcome)
    }

    fn poll_input<S: EventSource + ?Sized>(&mut self, source: &mut S) -> PacerResult<usize> {
        self.stats.polls += 1;

        let mut ready = source.wait_ready(Duration::ZERO)?;
        if !ready {
            let backoff = self.config.idle_backoff();
            if !backoff.is_zero() {
                ready = source.wait_ready(backoff)?;
            }
        }
        if !ready {
            self.stats.idle_polls += 1;
            return Ok(0);
        }

        let mut batch = std::mem::take(&mut self.batch);
        batch.clear();
        let result = match source.drain(&mut batch) {
            Ok(count) => {
                trace!(count, "input batch");
                batch
                    .iter()
                    .try_for_each(|&event| self.feed(event))
                    .map(|()| count)
            }
            Err(err) => Err(err),
        };
        batch.clear();
        self.batch = batch;
        result
    }

    /// Run until `cancel` is set or a fault occurs, then tear down.
    ///
    /// Teardown (device release, idle outputs) runs on every exit path. A loop fault
    /// takes precedence over a teardown fault when both happen.
    pub fn run<S, Sl>(
        &mut self,
        source: &mut S,
        sleeper: &mut Sl,
        cancel: &CancellationToken,
    ) -> PacerResult<PacerStats>
    where
        S: EventSource + ?Sized,
        Sl: Sleeper + ?Sized,
    {
        let outcome = self
            .start()
            .and_then(|()| self.run_loop(source, sleeper, cancel));
        match &outcome {
            Err(err) if err.is_input_fault() => warn!(error = %err, "input device lost"),
            Err(err) => warn!(error = %err, "pacing loop stopped on output fault"),
            Ok(()) => {}
        }

        let teardown = self.teardown(source);
        outcome.and(teardown)?;
        Ok(self.stats)
    }

    fn run_loop<S, Sl>(
        &mut self,
        source: &mut S,
        sleeper: &mut Sl,
        cancel: &CancellationToken,
    ) -> PacerResult<()>
    where
        S: EventSource + ?Sized,
        Sl: Sleeper + ?Sized,
    {
        while !cancel.is_cancelled() {
            self.tick(source, sleeper)?;
        }
        debug!(iterations = self.stats.iterations, "cancellation observed");
        Ok(())
    }

    /// Release the input device and drive every output to idle.
    ///
    /// Both actions are attempted even if the first fails; the first failure is
    /// returned. Backlogs are discarded and channels return to phase 0.
    pub fn teardown<S: EventSource + ?Sized>(&mut self, source: &mut S) -> PacerResult<()> {
        let released = source.release();
        if let Err(err) = &released {
            warn!(error = %err, "failed to release input device");
        }

        self.x.reset();
        self.y.reset();

        let reset = self.output.reset_idle();
        if let Err(err) = &reset {
            warn!(error = %err, "failed to reset outputs to idle");
        }

        released.and(reset)
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Steps currently owed on `axis` (signed).
    #[inline]
    pub fn pending(&self, axis: Axis) -> i32 {
        self.axis(axis).pending.count()
    }

    #[inline]
    pub fn phase(&self, axis: Axis) -> Phase {
        self.axis(axis).channel.phase()
    }

    #[inline]
    pub fn config(&self) -> &PacerConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &PacerStats {
        &self.stats
    }

    #[inline]
    pub fn output(&self) -> &O {
        &self.output
    }

    #[inline]
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ManualSleeper, MockEventSource, MockOutputBank};

    fn pacer() -> Pacer<MockOutputBank> {
        Pacer::new(PacerConfig::default(), MockOutputBank::new())
    }

    #[test]
    fn test_feed_applies_deadzone() -> PacerResult<()> {
        let mut pacer = pacer();
        pacer.feed(MouseEvent::motion(Axis::X, 1))?;
        pacer.feed(MouseEvent::motion(Axis::X, -1))?;
        pacer.feed(MouseEvent::motion(Axis::Y, 2))?;

        assert_eq!(pacer.pending(Axis::X), 0);
        assert_eq!(pacer.pending(Axis::Y), -2);
        assert_eq!(pacer.stats().deadzone_drops, 2);
        Ok(())
    }

    #[test]
    fn test_feed_without_y_inversion() -> PacerResult<()> {
        let mut pacer = Pacer::new(
            PacerConfig::default().with_invert_y(false),
            MockOutputBank::new(),
        );
        pacer.feed(MouseEvent::motion(Axis::Y, 5))?;
        assert_eq!(pacer.pending(Axis::Y), 10);
        Ok(())
    }

    #[test]
    fn test_feed_counts_truncation() -> PacerResult<()> {
        let mut pacer = pacer();
        for _ in 0..7 {
            pacer.feed(MouseEvent::motion(Axis::X, 100))?;
        }
        assert_eq!(pacer.pending(Axis::X), 300);
        assert_eq!(pacer.stats().truncations, 1);
        Ok(())
    }

    #[test]
    fn test_tick_drains_x_before_y() -> PacerResult<()> {
        let mut pacer = pacer();
        let mut source = MockEventSource::new();
        let mut sleeper = ManualSleeper::new();

        pacer.feed(MouseEvent::motion(Axis::X, 20))?; // 50 after clamp
        pacer.feed(MouseEvent::motion(Axis::X, 20))?; // 100
        pacer.feed(MouseEvent::motion(Axis::X, 20))?; // 150
        pacer.feed(MouseEvent::motion(Axis::Y, -3))?; // +3 after inversion
        pacer.output_mut().clear_history();

        let outcome = pacer.tick(&mut source, &mut sleeper)?;
        assert_eq!(outcome.tier.burst, 4);
        assert_eq!(outcome.steps_x, 4);
        assert_eq!(outcome.steps_y, 3);
        assert!(!outcome.polled);

        let lines: Vec<_> = pacer.output().history().iter().map(|(l, _)| *l).collect();
        let first_y = lines
            .iter()
            .position(|l| matches!(l, crate::OutputLine::YA | crate::OutputLine::YB));
        assert_eq!(first_y, Some(8));
        assert_eq!(sleeper.requested(), &[Duration::from_micros(50)]);
        Ok(())
    }

    #[test]
    fn test_idle_tick_waits_on_source() -> PacerResult<()> {
        let mut pacer = pacer();
        let mut source = MockEventSource::new();
        let mut sleeper = ManualSleeper::new();

        let outcome = pacer.tick(&mut source, &mut sleeper)?;
        assert!(!outcome.did_step());
        assert!(outcome.polled);
        assert_eq!(outcome.events, 0);
        assert_eq!(
            source.waits(),
            &[Duration::ZERO, Duration::from_micros(200)]
        );
        assert!(sleeper.requested().is_empty());
        assert_eq!(pacer.stats().polls, 1);
        assert_eq!(pacer.stats().idle_polls, 1);
        Ok(())
    }

    #[test]
    fn test_input_during_idle_wait_is_read() -> PacerResult<()> {
        let mut pacer = pacer();
        let mut source = MockEventSource::new();
        let mut sleeper = ManualSleeper::new();
        source.arrive_on_wait(2, vec![MouseEvent::motion(Axis::X, 5)]);

        let outcome = pacer.tick(&mut source, &mut sleeper)?;
        assert_eq!(outcome.events, 1);
        assert_eq!(pacer.pending(Axis::X), 10);
        assert_eq!(pacer.stats().idle_polls, 0);
        assert!(sleeper.requested().is_empty());
        Ok(())
    }

    #[test]
    fn test_zero_backoff_spins() -> PacerResult<()> {
        let mut pacer = Pacer::new(
            PacerConfig::default().with_idle_backoff(Duration::ZERO),
            MockOutputBank::new(),
        );
        let mut source = MockEventSource::new();
        let mut sleeper = ManualSleeper::new();

        pacer.tick(&mut source, &mut sleeper)?;
        assert_eq!(source.waits(), &[Duration::ZERO]);
        assert!(sleeper.requested().is_empty());
        Ok(())
    }
}
