//! Error types for serial forwarding.

use quadmouse_pacer::PacerError;

/// Errors surfaced while forwarding events over a serial link.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// Writing to or flushing the link failed.
    #[error("Serial link error: {0}")]
    Io(#[from] std::io::Error),

    /// The event source failed.
    #[error("Input error: {0}")]
    Pacer(#[from] PacerError),
}

impl SerialError {
    /// Check whether the fault came from the serial link rather than the input device.
    pub fn is_link_fault(&self) -> bool {
        matches!(self, SerialError::Io(_))
    }
}

/// Serial result type
pub type SerialResult<T = ()> = Result<T, SerialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_fault_classification() {
        let io = SerialError::from(std::io::Error::other("EIO"));
        assert!(io.is_link_fault());
        assert!(io.to_string().contains("EIO"));

        let input = SerialError::from(PacerError::Disconnected);
        assert!(!input.is_link_fault());
    }
}
