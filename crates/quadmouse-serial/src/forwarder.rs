//! Event-to-line forwarding loop.

use crate::config::SerialConfig;
use crate::debounce::ButtonDebouncer;
use crate::error::SerialResult;
use crate::protocol::SerialCommand;
use quadmouse_pacer::{CancellationToken, EventSource, MouseEvent};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Counters for one forwarding session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardStats {
    /// Events read from the device.
    pub events: u64,
    /// Lines written to the link.
    pub lines: u64,
    /// Motion events below the threshold.
    pub filtered: u64,
    /// Button transitions rejected by the debouncer.
    pub debounced: u64,
    /// Bounded waits that timed out with nothing to read.
    pub idle_waits: u64,
}

/// Forwards decoded events to a line-oriented writer.
pub struct SerialForwarder<W: Write> {
    writer: W,
    threshold: u32,
    debouncer: ButtonDebouncer,
    config: SerialConfig,
    stats: ForwardStats,
    batch: Vec<MouseEvent>,
}

impl<W: Write> SerialForwarder<W> {
    pub fn new(config: SerialConfig, writer: W) -> Self {
        Self {
            writer,
            threshold: config.motion_threshold,
            debouncer: ButtonDebouncer::new(config.debounce()),
            config,
            stats: ForwardStats::default(),
            batch: Vec::new(),
        }
    }

    /// Command for `event` observed at `now`, or `None` if it is filtered out.
    ///
    /// Motion is passed through unscaled and uninverted; only its magnitude is
    /// checked.
    pub fn translate(&mut self, event: MouseEvent, now: Instant) -> Option<SerialCommand> {
        match event {
            MouseEvent::Motion { axis, delta } => {
                if delta.unsigned_abs() < self.threshold {
                    self.stats.filtered += 1;
                    return None;
                }
                Some(SerialCommand::motion(axis, delta))
            }
            MouseEvent::Button { pressed } => {
                if !self.debouncer.accept(pressed, now) {
                    self.stats.debounced += 1;
                    trace!(pressed, "button transition debounced");
                    return None;
                }
                Some(SerialCommand::button(pressed))
            }
        }
    }

    /// Translate and write one event. Returns whether a line was sent.
    pub fn forward(&mut self, event: MouseEvent, now: Instant) -> SerialResult<bool> {
        self.stats.events += 1;
        let Some(command) = self.translate(event, now) else {
            return Ok(false);
        };

        command.write_line(&mut self.writer)?;
        self.writer.flush()?;
        self.stats.lines += 1;
        trace!(%command, "line sent");
        Ok(true)
    }

    /// Forward events until `cancel` is set or a fault occurs.
    ///
    /// Each wait is bounded by the configured timeout so cancellation is noticed
    /// even when the device is silent. The source is released on every exit path.
    pub fn run<S: EventSource + ?Sized>(
        &mut self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> SerialResult<ForwardStats> {
        let outcome = self.run_loop(source, cancel);
        match &outcome {
            Err(err) if err.is_link_fault() => warn!(error = %err, "serial link lost"),
            Err(err) => warn!(error = %err, "forwarding stopped on input fault"),
            Ok(()) => {}
        }

        let released = source.release();
        if let Err(err) = &released {
            warn!(error = %err, "failed to release input device");
        }

        outcome?;
        released?;
        Ok(self.stats)
    }

    fn run_loop<S: EventSource + ?Sized>(
        &mut self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> SerialResult<()> {
        let wait = self.config.wait_timeout();
        while !cancel.is_cancelled() {
            if !source.wait_ready(wait)? {
                self.stats.idle_waits += 1;
                continue;
            }

            let mut batch = std::mem::take(&mut self.batch);
            batch.clear();
            let result = source
                .drain(&mut batch)
                .map_err(Into::into)
                .and_then(|_| {
                    let now = Instant::now();
                    batch
                        .iter()
                        .try_for_each(|&event| self.forward(event, now).map(|_| ()))
                });
            batch.clear();
            self.batch = batch;
            result?;
        }
        debug!(lines = self.stats.lines, "cancellation observed");
        Ok(())
    }

    pub fn stats(&self) -> &ForwardStats {
        &self.stats
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadmouse_pacer::Axis;
    use std::time::Duration;

    fn forwarder() -> SerialForwarder<Vec<u8>> {
        SerialForwarder::new(SerialConfig::default(), Vec::new())
    }

    #[test]
    fn test_small_motion_filtered() -> SerialResult<()> {
        let mut fwd = forwarder();
        let now = Instant::now();

        assert!(!fwd.forward(MouseEvent::motion(Axis::X, 1), now)?);
        assert!(!fwd.forward(MouseEvent::motion(Axis::Y, -1), now)?);
        assert!(fwd.forward(MouseEvent::motion(Axis::Y, -2), now)?);

        assert_eq!(fwd.writer().as_slice(), b"Y:-2\n");
        assert_eq!(fwd.stats().filtered, 2);
        Ok(())
    }

    #[test]
    fn test_motion_not_scaled_or_inverted() -> SerialResult<()> {
        let mut fwd = forwarder();
        fwd.forward(MouseEvent::motion(Axis::Y, 40), Instant::now())?;
        assert_eq!(fwd.into_inner(), b"Y:40\n");
        Ok(())
    }

    #[test]
    fn test_button_debounced() -> SerialResult<()> {
        let mut fwd = forwarder();
        let t0 = Instant::now();

        fwd.forward(MouseEvent::button(true), t0)?;
        fwd.forward(MouseEvent::button(false), t0 + Duration::from_millis(20))?;
        fwd.forward(MouseEvent::button(false), t0 + Duration::from_millis(80))?;

        assert_eq!(fwd.writer().as_slice(), b"BTN:1\nBTN:0\n");
        assert_eq!(fwd.stats().debounced, 1);
        Ok(())
    }
}
