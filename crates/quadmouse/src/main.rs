//! quadmouse - USB mouse to quadrature / serial bridge
//!
//! Reads relative motion and the left button from a Linux input device and either
//! synthesizes mechanical-mouse encoder signals on GPIO lines or forwards the events
//! as text lines over a serial port.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod config;
mod error;
#[cfg(target_os = "linux")]
mod gpio;
mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quadmouse_pacer::CancellationToken;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{QuadArgs, SerialArgs};
use crate::config::BridgeConfig;
use crate::error::BridgeError;

#[derive(Parser)]
#[command(name = "quadmouse")]
#[command(about = "Bridge a USB mouse to quadrature encoder lines or a serial link")]
#[command(version)]
#[command(long_about = "
quadmouse reads a USB mouse through the Linux input subsystem and replays its
motion either as the two-phase square waves of a mechanical ball mouse on GPIO
lines (quad) or as a simple line protocol on a serial port (serial).

Press Ctrl-C to stop; all outputs are returned to High before exit.
")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file
    #[arg(short, long, global = true, env = "QUADMOUSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive quadrature encoder signals on GPIO lines
    Quad(QuadArgs),

    /// Forward motion and button events over a serial port
    Serial(SerialArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                ["quadmouse", "quadmouse_pacer", "quadmouse_serial"]
                    .map(|target| format!("{target}={log_level}"))
                    .join(",")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Map a failed run to the process exit status.
///
/// Setup errors carry their own code. Faults raised while the bridge is running
/// (a lost device, a dead GPIO line, a broken serial link) also exit with 1 so a
/// supervisor can tell them apart from a Ctrl-C stop.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<BridgeError>() {
        Some(err) => err.exit_code(),
        None => 1,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = BridgeConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load configuration from '{}'", path.display()),
        None => "failed to build default configuration".to_string(),
    })?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            cancel.cancel();
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let result = match &cli.command {
        Commands::Quad(args) => commands::quad::execute(args, config, &cancel),
        Commands::Serial(args) => commands::serial::execute(args, config, &cancel),
    };
    if result.is_ok() {
        info!("interrupted, exiting");
    }
    result
}
