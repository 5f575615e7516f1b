//! Error types for the pacer crate.

use crate::ports::OutputLine;

/// Errors surfaced by the pacing loop and its ports.
///
/// Every variant is fatal to the run loop: the pacer stops, runs teardown, and hands
/// the error back to the caller. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PacerError {
    /// A digital output line could not be driven.
    #[error("Failed to drive output line {line}: {message}")]
    Output {
        /// Line that rejected the write
        line: OutputLine,
        /// Driver-provided reason
        message: String,
    },

    /// The input device reported an error while polling or reading.
    #[error("Input device error: {0}")]
    Input(String),

    /// The input device went away.
    #[error("Input device disconnected")]
    Disconnected,

    /// IO error from an underlying file descriptor.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PacerError {
    /// Create an output error.
    pub fn output(line: OutputLine, message: impl Into<String>) -> Self {
        PacerError::Output {
            line,
            message: message.into(),
        }
    }

    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        PacerError::Input(message.into())
    }

    /// Check whether the error came from the input side of the bridge.
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            PacerError::Input(_) | PacerError::Disconnected | PacerError::Io(_)
        )
    }
}

/// Pacer result type
pub type PacerResult<T = ()> = Result<T, PacerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_error_names_line() {
        let err = PacerError::output(OutputLine::XA, "pin busy");
        let msg = err.to_string();
        assert!(msg.contains("X-A"));
        assert!(msg.contains("pin busy"));
        assert!(!err.is_input_fault());
    }

    #[test]
    fn test_input_faults() {
        assert!(PacerError::Disconnected.is_input_fault());
        assert!(PacerError::input("EIO").is_input_fault());
        let io = std::io::Error::other("boom");
        assert!(PacerError::from(io).is_input_fault());
    }
}
