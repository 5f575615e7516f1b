//! Serial forwarding configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Link and filtering settings for the serial variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    /// Serial device path.
    pub port: String,
    pub baud_rate: u32,
    /// Write timeout of the serial link.
    pub timeout_ms: u64,
    /// Minimum absolute motion delta that is forwarded.
    pub motion_threshold: u32,
    /// Minimum spacing between forwarded button transitions.
    pub debounce_ms: u64,
    /// Upper bound on a single wait for input, so cancellation is noticed.
    pub wait_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT.to_string(),
            baud_rate: crate::DEFAULT_BAUD_RATE,
            timeout_ms: 1_000,
            motion_threshold: 2,
            debounce_ms: 50,
            wait_timeout_ms: 100,
        }
    }
}

impl SerialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[inline]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// A zero baud rate or an empty port cannot be opened.
    pub fn is_valid(&self) -> bool {
        !self.port.is_empty() && self.baud_rate > 0
    }
}
