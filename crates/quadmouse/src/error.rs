//! Error types for the quadmouse binary

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No pointing device found: {0}")]
    DeviceNotFound(String),

    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Failed to open serial port {port}: {message}")]
    SerialOpen { port: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Process exit code for this error.
    ///
    /// Every failure currently exits with 1; a clean interrupt is the only 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            BridgeError::DeviceNotFound(_)
            | BridgeError::Gpio(_)
            | BridgeError::SerialOpen { .. }
            | BridgeError::InvalidConfig(_)
            | BridgeError::Unsupported(_)
            | BridgeError::Io(_)
            | BridgeError::Json(_) => 1,
        }
    }
}
