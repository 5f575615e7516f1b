//! Raspberry Pi GPIO output bank.

use crate::config::PinConfig;
use crate::error::BridgeError;
use quadmouse_pacer::{Level, OutputBank, OutputLine, PacerResult};
use rppal::gpio::{self, Gpio, OutputPin};
use tracing::info;

/// The five output lines, claimed as outputs starting High.
///
/// Lines are driven High again on drop; rppal then returns the pins to their
/// previous mode.
pub struct GpioOutputs {
    pins: [(OutputLine, OutputPin); 5],
}

impl GpioOutputs {
    pub fn open(config: &PinConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        let gpio = Gpio::new().map_err(|e| BridgeError::Gpio(e.to_string()))?;

        let claim = |line: OutputLine| -> Result<(OutputLine, OutputPin), BridgeError> {
            let pin = config.pin(line);
            let output = gpio
                .get(pin)
                .map_err(|e| BridgeError::Gpio(format!("{line} (BCM {pin}): {e}")))?
                .into_output_high();
            Ok((line, output))
        };

        let pins = [
            claim(OutputLine::XA)?,
            claim(OutputLine::XB)?,
            claim(OutputLine::YA)?,
            claim(OutputLine::YB)?,
            claim(OutputLine::Button)?,
        ];
        info!(
            x_a = config.x_a,
            x_b = config.x_b,
            y_a = config.y_a,
            y_b = config.y_b,
            button = config.button,
            "GPIO outputs claimed"
        );
        Ok(Self { pins })
    }

    fn pin_mut(&mut self, line: OutputLine) -> Option<&mut OutputPin> {
        self.pins
            .iter_mut()
            .find(|(candidate, _)| *candidate == line)
            .map(|(_, pin)| pin)
    }
}

impl OutputBank for GpioOutputs {
    fn write(&mut self, line: OutputLine, level: Level) -> PacerResult<()> {
        let pin = self
            .pin_mut(line)
            .ok_or_else(|| quadmouse_pacer::PacerError::output(line, "line not claimed"))?;
        pin.write(match level {
            Level::Low => gpio::Level::Low,
            Level::High => gpio::Level::High,
        });
        Ok(())
    }
}

impl Drop for GpioOutputs {
    fn drop(&mut self) {
        for (_, pin) in &mut self.pins {
            pin.set_high();
        }
    }
}
