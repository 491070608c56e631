//! Relay statistics

use std::sync::atomic::{AtomicU64, Ordering};

use super::delivery::{DeliveryOutcome, DropReason};

/// Live relay counters
///
/// Shared through an `Arc` so other tasks can watch a running relay.
#[derive(Debug, Default)]
pub struct RelayStats {
    samples_read: AtomicU64,
    sent: AtomicU64,
    dropped_buffer_exhausted: AtomicU64,
    dropped_buffer_too_small: AtomicU64,
    dropped_connect_failed: AtomicU64,
    dropped_send_failed: AtomicU64,
    lagged_samples: AtomicU64,
}

impl RelayStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.samples_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lagged(&self, missed: u64) {
        self.lagged_samples.fetch_add(missed, Ordering::Relaxed);
    }

    pub(crate) fn record_outcome(&self, outcome: DeliveryOutcome) {
        let counter = match outcome {
            DeliveryOutcome::Sent => &self.sent,
            DeliveryOutcome::Dropped(DropReason::BufferExhausted) => &self.dropped_buffer_exhausted,
            DeliveryOutcome::Dropped(DropReason::BufferTooSmall) => &self.dropped_buffer_too_small,
            DeliveryOutcome::Dropped(DropReason::ConnectFailed) => &self.dropped_connect_failed,
            DeliveryOutcome::Dropped(DropReason::SendFailed) => &self.dropped_send_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            samples_read: self.samples_read.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            dropped_buffer_exhausted: self.dropped_buffer_exhausted.load(Ordering::Relaxed),
            dropped_buffer_too_small: self.dropped_buffer_too_small.load(Ordering::Relaxed),
            dropped_connect_failed: self.dropped_connect_failed.load(Ordering::Relaxed),
            dropped_send_failed: self.dropped_send_failed.load(Ordering::Relaxed),
            lagged_samples: self.lagged_samples.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the relay counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStatsSnapshot {
    /// Samples read from the bus
    pub samples_read: u64,
    /// Samples the transport confirmed
    pub sent: u64,
    /// Dropped for lack of a transmit buffer
    pub dropped_buffer_exhausted: u64,
    /// Dropped because the transport's buffer could not hold the sample
    pub dropped_buffer_too_small: u64,
    /// Dropped because the connection could not be opened
    pub dropped_connect_failed: u64,
    /// Dropped because the send failed
    pub dropped_send_failed: u64,
    /// Samples missed on the bus because the relay fell behind
    pub lagged_samples: u64,
}

impl RelayStatsSnapshot {
    /// Total samples dropped after being read
    pub fn dropped(&self) -> u64 {
        self.dropped_buffer_exhausted
            + self.dropped_buffer_too_small
            + self.dropped_connect_failed
            + self.dropped_send_failed
    }

    /// Fraction of read samples that were sent (0.0 when nothing was read)
    pub fn delivery_ratio(&self) -> f64 {
        if self.samples_read > 0 {
            self.sent as f64 / self.samples_read as f64
        } else {
            0.0
        }
    }
}
