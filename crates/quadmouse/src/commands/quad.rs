//! Quadrature bridge command

use anyhow::Result;
use quadmouse_pacer::CancellationToken;

use super::QuadArgs;
use crate::config::BridgeConfig;

/// Run the quadrature bridge until `cancel` is set.
#[cfg(target_os = "linux")]
pub fn execute(args: &QuadArgs, config: BridgeConfig, cancel: &CancellationToken) -> Result<()> {
    use crate::gpio::GpioOutputs;
    use crate::input::EvdevSource;
    use anyhow::Context;
    use quadmouse_pacer::{Pacer, PrecisionSleeper};
    use tracing::info;

    let path = match &args.device {
        Some(path) => path.clone(),
        None => EvdevSource::discover()?.0,
    };
    let mut source = EvdevSource::open(&path, !args.no_grab)?;
    let outputs = GpioOutputs::open(&config.pins)?;

    let mut pacer = Pacer::new(config.pacer, outputs);
    let mut sleeper = PrecisionSleeper::new();
    let stats = pacer
        .run(&mut source, &mut sleeper, cancel)
        .with_context(|| format!("quadrature bridge on {} failed", source.name()))?;

    info!(
        iterations = stats.iterations,
        steps_x = stats.steps_x,
        steps_y = stats.steps_y,
        events = stats.events,
        truncations = stats.truncations,
        idle_poll_rate = stats.idle_poll_rate(),
        "quadrature bridge stopped"
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn execute(_args: &QuadArgs, _config: BridgeConfig, _cancel: &CancellationToken) -> Result<()> {
    Err(crate::error::BridgeError::Unsupported("the quadrature bridge requires Linux").into())
}
