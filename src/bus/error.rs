//! Bus error types
//!
//! Error types for telemetry bus operations.

/// Error type for bus operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Bus has not been opened for subscribers yet
    NotReady,
    /// All subscriber slots are taken (carries the limit)
    SubscriberLimit(usize),
    /// Subscriber fell behind and missed this many samples
    Lagged(u64),
    /// Bus was shut down
    Closed,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusError::NotReady => write!(f, "Bus not ready"),
            BusError::SubscriberLimit(max) => {
                write!(f, "Subscriber limit reached: {}", max)
            }
            BusError::Lagged(n) => write!(f, "Subscriber lagged, {} samples missed", n),
            BusError::Closed => write!(f, "Bus closed"),
        }
    }
}

impl std::error::Error for BusError {}
