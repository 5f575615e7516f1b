//! Button transition debouncing.

use std::time::{Duration, Instant};

/// Forwards a button state only when it changes and enough time has passed.
///
/// The window is measured from the last *forwarded* transition. Suppressed
/// transitions do not restart it.
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    window: Duration,
    last: Option<(bool, Instant)>,
}

impl ButtonDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Decide whether `pressed`, observed at `now`, should be forwarded.
    ///
    /// The first transition is always accepted. Later ones must differ from the last
    /// forwarded state and arrive strictly more than `window` after it.
    pub fn accept(&mut self, pressed: bool, now: Instant) -> bool {
        let accepted = match self.last {
            None => true,
            Some((state, at)) => state != pressed && now.saturating_duration_since(at) > self.window,
        };
        if accepted {
            self.last = Some((pressed, now));
        }
        accepted
    }

    /// Last forwarded state, if any.
    pub fn state(&self) -> Option<bool> {
        self.last.map(|(state, _)| state)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
