//! Hardware-facing traits for the pacer.
//!
//! The pacer never touches a file descriptor or a GPIO register directly. Adapters
//! implement these traits for real devices; [`crate::mock`] implements them for tests.

use crate::error::{PacerError, PacerResult};
use crate::events::{Axis, MouseEvent};
use std::fmt;
use std::time::Duration;

/// Digital output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level every output rests at while nothing is happening.
    pub const IDLE: Level = Level::High;

    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

/// One of the five output lines driven by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputLine {
    /// X encoder, phase A
    XA,
    /// X encoder, phase B
    XB,
    /// Y encoder, phase A
    YA,
    /// Y encoder, phase B
    YB,
    /// Primary button
    Button,
}

impl OutputLine {
    /// All lines, in the order they are initialized and reset.
    pub const ALL: [OutputLine; 5] = [
        OutputLine::XA,
        OutputLine::XB,
        OutputLine::YA,
        OutputLine::YB,
        OutputLine::Button,
    ];

    /// Phase A and phase B lines of an axis.
    pub fn phase_lines(axis: Axis) -> (OutputLine, OutputLine) {
        match axis {
            Axis::X => (OutputLine::XA, OutputLine::XB),
            Axis::Y => (OutputLine::YA, OutputLine::YB),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputLine::XA => "X-A",
            OutputLine::XB => "X-B",
            OutputLine::YA => "Y-A",
            OutputLine::YB => "Y-B",
            OutputLine::Button => "BTN",
        }
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for the five digital output lines.
pub trait OutputBank {
    /// Drive a single line. Expected to be non-blocking.
    fn write(&mut self, line: OutputLine, level: Level) -> PacerResult<()>;

    /// Drive every line to [`Level::IDLE`].
    ///
    /// All lines are attempted even if one fails; the first failure is returned.
    fn reset_idle(&mut self) -> PacerResult<()> {
        let mut first_error: Option<PacerError> = None;
        for line in OutputLine::ALL {
            if let Err(err) = self.write(line, Level::IDLE) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Source of decoded pointer events.
pub trait EventSource {
    /// Wait up to `timeout` for input to become readable.
    ///
    /// A zero timeout is a pure readiness check and must not block. A non-zero
    /// timeout may be rounded up to the resolution of the underlying wait.
    fn wait_ready(&mut self, timeout: Duration) -> PacerResult<bool>;

    /// Append every currently buffered event to `events` without blocking.
    ///
    /// Returns the number of events appended.
    fn drain(&mut self, events: &mut Vec<MouseEvent>) -> PacerResult<usize>;

    /// Give up exclusive access to the device. Calling it twice is harmless.
    fn release(&mut self) -> PacerResult<()>;
}

/// Suspension point of the pacing loop.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}
