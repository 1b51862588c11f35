//! Faults of the servo bus and their classification

use std::io;

/// Everything that can go wrong on the bus. The driver never hands these to callers of
/// its read and write operations: they are logged and turned into an absent result.
/// Only input validation (`InvalidServoId`) surfaces as an error.
#[derive(Debug)]
pub enum BusError {
    /// Transport failure other than a timeout (device unplugged, GPIO unavailable).
    Io(io::Error),
    /// Nothing arrived within the read timeout.
    Timeout,
    /// Not enough bytes for a complete frame.
    Truncated,
    /// Bytes do not form a frame of this protocol.
    Malformed(String),
    ChecksumMismatch { expected: u8, found: u8 },
    /// A valid frame arrived, but for another servo or command.
    Unmatched,
    /// Id outside 0..=254, or the broadcast id where a concrete servo is required.
    InvalidServoId(u8),
}

impl BusError {
    /// Classifies a transport fault. Timeouts are told apart from other I/O failures
    /// because they are expected when a servo does not answer.
    pub fn classify(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => BusError::Timeout,
            _ => BusError::Io(err),
        }
    }

    /// Transient faults are retried by [`read_with_retry`](crate::driver::BusServoDriver::read_with_retry).
    /// A missing or closed device and an invalid id stay that way.
    pub fn is_transient(&self) -> bool {
        match self {
            BusError::Io(err) => !matches!(
                err.kind(),
                io::ErrorKind::NotFound
                    | io::ErrorKind::PermissionDenied
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
            ),
            BusError::InvalidServoId(_) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            BusError::Io(ref err) =>
                write!(f, "Bus I/O error: {}", err),
            BusError::Timeout =>
                write!(f, "No response within timeout"),
            BusError::Truncated =>
                write!(f, "Truncated frame"),
            BusError::Malformed(ref msg) =>
                write!(f, "Malformed frame: {}", msg),
            BusError::ChecksumMismatch { expected, found } =>
                write!(f, "Checksum mismatch: expected {:#04x}, found {:#04x}", expected, found),
            BusError::Unmatched =>
                write!(f, "Response does not match the request"),
            BusError::InvalidServoId(id) =>
                write!(f, "Invalid servo id {}", id),
        }
    }
}

impl std::error::Error for BusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BusError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BusError {
    fn from(err: io::Error) -> Self {
        BusError::classify(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let timeout = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        assert!(matches!(BusError::classify(timeout), BusError::Timeout));

        let gone = io::Error::new(io::ErrorKind::BrokenPipe, "device removed");
        assert!(matches!(BusError::from(gone), BusError::Io(_)));
    }

    #[test]
    fn test_transient() {
        assert!(BusError::Timeout.is_transient());
        assert!(BusError::Unmatched.is_transient());
        assert!(!BusError::InvalidServoId(255).is_transient());
        assert!(BusError::Malformed("no header".into()).is_transient());

        let noise = io::Error::new(io::ErrorKind::InvalidData, "framing error");
        assert!(BusError::classify(noise).is_transient());
        let gone = io::Error::new(io::ErrorKind::NotFound, "no such device");
        assert!(!BusError::classify(gone).is_transient());
    }
}
