//! Decoded input events and the axis/direction vocabulary shared by every module.

use std::fmt;

/// Motion axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Both axes in scheduling order.
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a single encoder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Direction matching the sign of `value`, or `None` for zero.
    pub fn of(value: i32) -> Option<Self> {
        match value.signum() {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Reverse),
            _ => None,
        }
    }

    /// Signed unit step: +1 forward, -1 reverse.
    #[inline]
    pub fn delta(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// An already-decoded event from the pointing device.
///
/// Only relative motion and the primary button are represented; adapters drop every
/// other event class before it reaches the pacer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// Relative motion in raw device counts.
    Motion { axis: Axis, delta: i32 },
    /// Primary button changed state.
    Button { pressed: bool },
}

impl MouseEvent {
    pub fn motion(axis: Axis, delta: i32) -> Self {
        MouseEvent::Motion { axis, delta }
    }

    pub fn button(pressed: bool) -> Self {
        MouseEvent::Button { pressed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of_sign() {
        assert_eq!(Direction::of(17), Some(Direction::Forward));
        assert_eq!(Direction::of(-1), Some(Direction::Reverse));
        assert_eq!(Direction::of(0), None);
        assert_eq!(Direction::of(i32::MIN), Some(Direction::Reverse));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Forward.delta(), 1);
        assert_eq!(Direction::Reverse.delta(), -1);
    }

    #[test]
    fn test_axis_display() {
        assert_eq!(Axis::X.to_string(), "X");
        assert_eq!(Axis::Y.to_string(), "Y");
    }
}
