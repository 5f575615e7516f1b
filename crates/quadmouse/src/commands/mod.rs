//! Command implementations for quadmouse

pub mod quad;
pub mod serial;

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct QuadArgs {
    /// Input event device (default: first device named like a mouse)
    #[arg(short, long, env = "QUADMOUSE_DEVICE")]
    pub device: Option<PathBuf>,

    /// Leave the device shared with other readers instead of grabbing it
    #[arg(long)]
    pub no_grab: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SerialArgs {
    /// Input event device (default: first device named like a mouse or pointer)
    #[arg(short, long, env = "QUADMOUSE_DEVICE")]
    pub device: Option<PathBuf>,

    /// Serial port to write to (default: /dev/serial0)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate (default: 115200)
    #[arg(short, long)]
    pub baud: Option<u32>,
}
