//! Quadrature phase machine and waveform table.

use crate::error::PacerResult;
use crate::events::{Axis, Direction};
use crate::ports::{Level, OutputBank, OutputLine};

/// Two-bit output pattern: (phase A, phase B).
pub type Pattern = (Level, Level);

/// The four legal encoder states, indexed by phase.
///
/// Neighbouring entries, including 3 → 0, differ in exactly one line.
pub const WAVEFORM: [Pattern; 4] = [
    (Level::High, Level::High),
    (Level::Low, Level::High),
    (Level::Low, Level::Low),
    (Level::High, Level::Low),
];

/// Cyclic phase index in `[0, 4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Phase(u8);

impl Phase {
    pub const ZERO: Phase = Phase(0);

    /// Phase for an arbitrary (possibly negative) index, reduced modulo 4.
    pub fn new(index: i32) -> Self {
        Phase(u8::try_from(index.rem_euclid(4)).unwrap_or(0))
    }

    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Phase one step away in `direction`, wrapping both ways.
    pub fn advanced(self, direction: Direction) -> Self {
        Phase::new(i32::from(self.0) + direction.delta())
    }

    /// Output pattern for this phase.
    pub fn pattern(self) -> Pattern {
        WAVEFORM
            .get(self.index())
            .copied()
            .unwrap_or((Level::IDLE, Level::IDLE))
    }
}

/// Per-axis quadrature output channel.
#[derive(Debug, Clone)]
pub struct QuadratureChannel {
    axis: Axis,
    phase: Phase,
    lines: (OutputLine, OutputLine),
}

impl QuadratureChannel {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            phase: Phase::ZERO,
            lines: OutputLine::phase_lines(axis),
        }
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn pattern(&self) -> Pattern {
        self.phase.pattern()
    }

    /// Drive the current pattern onto the axis lines, phase A first.
    pub fn emit<O: OutputBank + ?Sized>(&self, output: &mut O) -> PacerResult<()> {
        let (a, b) = self.pattern();
        output.write(self.lines.0, a)?;
        output.write(self.lines.1, b)
    }

    /// Step one phase in `direction` and drive the new pattern.
    pub fn advance<O: OutputBank + ?Sized>(
        &mut self,
        direction: Direction,
        output: &mut O,
    ) -> PacerResult<()> {
        self.phase = self.phase.advanced(direction);
        self.emit(output)
    }

    /// Return to phase 0 without touching the outputs.
    pub fn reset(&mut self) {
        self.phase = Phase::ZERO;
    }
}
