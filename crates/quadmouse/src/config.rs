//! Bridge configuration file.

use crate::error::BridgeError;
use quadmouse_pacer::{OutputLine, PacerConfig};
use quadmouse_serial::SerialConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// BCM pin numbers of the five output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinConfig {
    pub x_a: u8,
    pub x_b: u8,
    pub y_a: u8,
    pub y_b: u8,
    pub button: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            x_a: 6,
            x_b: 5,
            y_a: 4,
            y_b: 3,
            button: 2,
        }
    }
}

impl PinConfig {
    pub fn pin(&self, line: OutputLine) -> u8 {
        match line {
            OutputLine::XA => self.x_a,
            OutputLine::XB => self.x_b,
            OutputLine::YA => self.y_a,
            OutputLine::YB => self.y_b,
            OutputLine::Button => self.button,
        }
    }

    /// Every line must use its own pin.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let mut seen = BTreeSet::new();
        for line in OutputLine::ALL {
            let pin = self.pin(line);
            if !seen.insert(pin) {
                return Err(BridgeError::InvalidConfig(format!(
                    "pin {pin} assigned to more than one line ({line} repeats it)"
                )));
            }
        }
        Ok(())
    }
}

/// Top-level configuration file contents. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub pacer: PacerConfig,
    pub pins: PinConfig,
    pub serial: SerialConfig,
}

impl BridgeConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, BridgeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        let mut config: BridgeConfig = serde_json::from_str(text)?;
        config.validate()?;
        config.pacer.normalize();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        self.pins.validate()?;
        if !self.serial.is_valid() {
            return Err(BridgeError::InvalidConfig(
                "serial port must be non-empty with a non-zero baud rate".into(),
            ));
        }
        Ok(())
    }
}
