//! Motion-to-quadrature translation and adaptive step pacing.
//!
//! This crate turns relative mouse motion into the two-bit square-wave pairs a
//! mechanical mouse's optical encoders would produce. It includes:
//!
//! - **Motion scaling**: piecewise non-linear gain with a per-event clamp
//! - **Quadrature channels**: one Gray-code phase machine per axis
//! - **Pending-step buffers**: bounded per-axis backlog of owed encoder steps
//! - **Pacing schedule**: backlog-driven burst size and inter-step delay
//! - **Pacer**: the cooperative loop that drains backlog and polls input
//!
//! Hardware is reached only through the [`ports`] traits, so the whole engine runs
//! against the [`mock`] implementations in tests.
//!
//! # Loop Guarantees
//!
//! - **No heap allocations** per iteration once the event batch buffer has grown
//! - **Never blocks** on input while backlog is owed (readiness checks use a zero timeout)
//! - **Bounded lag**: each axis owes at most `queue_limit` steps
//! - **Idle outputs on exit**: teardown runs on cancellation and on faults
//!
//! # Example
//!
//! ```
//! use quadmouse_pacer::mock::{ManualSleeper, MockEventSource, MockOutputBank};
//! use quadmouse_pacer::{Axis, MouseEvent, Pacer, PacerConfig};
//!
//! let mut pacer = Pacer::new(PacerConfig::default(), MockOutputBank::new());
//! let mut source = MockEventSource::new();
//! source.push_batch(vec![MouseEvent::motion(Axis::X, 3)]);
//! let mut sleeper = ManualSleeper::new();
//!
//! pacer.start().expect("mock outputs never fail");
//! for _ in 0..8 {
//!     pacer.tick(&mut source, &mut sleeper).expect("mock tick");
//! }
//! assert_eq!(pacer.pending(Axis::X), 0);
//! assert_eq!(pacer.output().transitions(Axis::X), 3);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod button;
pub mod cancel;
pub mod config;
pub mod error;
pub mod events;
pub mod mock;
pub mod pacer;
pub mod pacing;
pub mod pending;
pub mod ports;
pub mod quadrature;
pub mod scaler;
pub mod sleep;
pub mod stats;

pub use button::ButtonRelay;
pub use cancel::CancellationToken;
pub use config::PacerConfig;
pub use error::{PacerError, PacerResult};
pub use events::{Axis, Direction, MouseEvent};
pub use pacer::{Pacer, TickOutcome};
pub use pacing::{PacingSchedule, PacingTier};
pub use pending::PendingSteps;
pub use ports::{EventSource, Level, OutputBank, OutputLine, Sleeper};
pub use quadrature::{Phase, QuadratureChannel, WAVEFORM};
pub use scaler::{ScalingConfig, scale_delta};
pub use sleep::PrecisionSleeper;
pub use stats::PacerStats;

/// Minimum raw delta magnitude accepted from the device.
pub const DEFAULT_DEADZONE: u32 = 2;

/// Maximum steps an axis may owe before the backlog is truncated.
pub const DEFAULT_QUEUE_LIMIT: u32 = 300;

/// Maximum steps a single motion event may contribute.
pub const DEFAULT_MAX_EVENT_STEPS: u32 = 50;

/// Longest blocking wait on the input device during an idle check, in microseconds.
pub const DEFAULT_IDLE_BACKOFF_US: u64 = 200;
