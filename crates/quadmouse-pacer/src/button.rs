//! Primary button pass-through.

use crate::error::PacerResult;
use crate::ports::{Level, OutputBank, OutputLine};

/// Mirrors the primary button onto its output line.
///
/// Outputs idle high, so a pressed button pulls the line low. There is no buffering
/// and no debounce: the write happens while the event is being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRelay {
    line: OutputLine,
}

impl ButtonRelay {
    pub fn new() -> Self {
        Self {
            line: OutputLine::Button,
        }
    }

    #[inline]
    pub fn line(&self) -> OutputLine {
        self.line
    }

    /// Output level for a button state.
    #[inline]
    pub fn level_for(pressed: bool) -> Level {
        if pressed { Level::Low } else { Level::High }
    }

    pub fn relay<O: OutputBank + ?Sized>(&self, output: &mut O, pressed: bool) -> PacerResult<()> {
        output.write(self.line, Self::level_for(pressed))
    }
}

impl Default for ButtonRelay {
    fn default() -> Self {
        Self::new()
    }
}
