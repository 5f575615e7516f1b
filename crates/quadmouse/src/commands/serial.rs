//! Serial forwarding command

use anyhow::Result;
use quadmouse_pacer::CancellationToken;
use quadmouse_serial::SerialConfig;

use super::SerialArgs;
use crate::config::BridgeConfig;

/// Apply command-line overrides on top of the file configuration.
pub fn resolve(args: &SerialArgs, config: &BridgeConfig) -> SerialConfig {
    let mut serial = config.serial.clone();
    if let Some(port) = &args.port {
        serial.port.clone_from(port);
    }
    if let Some(baud) = args.baud {
        serial.baud_rate = baud;
    }
    serial
}

/// Forward events over the serial link until `cancel` is set.
#[cfg(target_os = "linux")]
pub fn execute(args: &SerialArgs, config: BridgeConfig, cancel: &CancellationToken) -> Result<()> {
    use crate::error::BridgeError;
    use crate::input::EvdevSource;
    use anyhow::Context;
    use quadmouse_serial::SerialForwarder;
    use tracing::info;

    let serial = resolve(args, &config);
    if !serial.is_valid() {
        return Err(BridgeError::InvalidConfig(format!(
            "cannot open serial port {:?} at {} baud",
            serial.port, serial.baud_rate
        ))
        .into());
    }

    let path = match &args.device {
        Some(path) => path.clone(),
        None => EvdevSource::discover()?.0,
    };
    // The serial variant shares the device with other readers.
    let mut source = EvdevSource::open(&path, false)?;

    let port = serialport::new(serial.port.as_str(), serial.baud_rate)
        .timeout(serial.timeout())
        .open()
        .map_err(|e| BridgeError::SerialOpen {
            port: serial.port.clone(),
            message: e.to_string(),
        })?;
    info!(port = %serial.port, baud = serial.baud_rate, "serial link open");

    let mut forwarder = SerialForwarder::new(serial, port);
    let stats = forwarder
        .run(&mut source, cancel)
        .context("serial forwarding failed")?;

    info!(
        events = stats.events,
        lines = stats.lines,
        filtered = stats.filtered,
        debounced = stats.debounced,
        "serial forwarding stopped"
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn execute(_args: &SerialArgs, _config: BridgeConfig, _cancel: &CancellationToken) -> Result<()> {
    Err(crate::error::BridgeError::Unsupported("serial forwarding requires Linux").into())
}
