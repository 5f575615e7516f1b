//! Serial forwarding of pointer events.
//!
//! Instead of synthesizing encoder waveforms, this variant sends each qualifying event
//! down a serial link as one text line:
//!
//! ```text
//! X:<delta>
//! Y:<delta>
//! BTN:<0|1>
//! ```
//!
//! Motion below a small threshold is dropped and button transitions are debounced.
//! The event source is the same [`quadmouse_pacer::EventSource`] the quadrature
//! bridge reads from.

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod config;
pub mod debounce;
pub mod error;
pub mod forwarder;
pub mod protocol;

pub use config::SerialConfig;
pub use debounce::ButtonDebouncer;
pub use error::{SerialError, SerialResult};
pub use forwarder::{ForwardStats, SerialForwarder};
pub use protocol::{ParseCommandError, SerialCommand};

/// Default serial device.
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Default line rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
