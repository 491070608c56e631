//! Error types
//!
//! Crate-wide error and result types. Bus-specific failures live in
//! [`crate::bus::BusError`] and convert into [`Error::Bus`].

use std::net::SocketAddr;
use std::time::Duration;

use crate::bus::BusError;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Debug)]
pub enum Error {
    /// I/O error from the underlying socket
    Io(std::io::Error),
    /// Telemetry bus error
    Bus(BusError),
    /// Bus shut down while the relay was reading
    BusClosed,
    /// Subscription was not established within the retry policy's deadline
    SubscribeTimeout {
        /// Number of subscribe attempts made
        attempts: u32,
        /// Time spent retrying
        waited: Duration,
    },
    /// Connection to the destination did not complete in time
    ConnectTimeout(SocketAddr),
    /// Send did not complete in time
    SendTimeout(SocketAddr),
    /// Payload does not fit the transmit buffer
    PayloadTooLarge {
        /// Payload length in bytes
        len: usize,
        /// Buffer capacity in bytes
        capacity: usize,
    },
    /// Sample payload has the wrong length
    InvalidSampleSize(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Bus(e) => write!(f, "Bus error: {}", e),
            Error::BusClosed => write!(f, "Telemetry bus closed"),
            Error::SubscribeTimeout { attempts, waited } => write!(
                f,
                "Subscription not established after {} attempts ({:?})",
                attempts, waited
            ),
            Error::ConnectTimeout(addr) => write!(f, "Connect to {} timed out", addr),
            Error::SendTimeout(addr) => write!(f, "Send to {} timed out", addr),
            Error::PayloadTooLarge { len, capacity } => write!(
                f,
                "Payload of {} bytes exceeds buffer capacity {}",
                len, capacity
            ),
            Error::InvalidSampleSize(len) => write!(f, "Invalid sample size: {} bytes", len),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Bus(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        match e {
            BusError::Closed => Error::BusClosed,
            other => Error::Bus(other),
        }
    }
}
