//! Per-sample connection lifecycle
//!
//! Each sample gets its own buffer and its own connection:
//!
//! ```text
//! Idle ──► BufferAcquired ──► ConnectionOpen ──► Sent ──────► Closed
//!  ▲            │                   │                          ▲
//!  │            │ open failed       └──► SendFailed ───────────┘
//!  └────────────┘ (buffer freed)
//! ```
//!
//! Delivery is best-effort. Failures drop the sample and are reported only
//! through the returned [`DeliveryOutcome`]; nothing is retried.

use std::net::SocketAddr;
use std::time::Duration;

use crate::bus::{TelemetrySample, SAMPLE_SIZE};
use crate::transport::{ConnectOptions, Transport};

/// Where and how to deliver samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Logging node address
    pub destination: SocketAddr,
    /// Timeout applied to open and to send
    pub timeout: Duration,
    /// Connection options
    pub options: ConnectOptions,
}

/// Why a sample was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No transmit buffer available
    BufferExhausted,
    /// Transport handed out a buffer too small for a sample
    BufferTooSmall,
    /// Connection to the destination could not be opened
    ConnectFailed,
    /// Connection opened but the send did not complete
    SendFailed,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::BufferExhausted => write!(f, "buffer exhausted"),
            DropReason::BufferTooSmall => write!(f, "buffer too small"),
            DropReason::ConnectFailed => write!(f, "connect failed"),
            DropReason::SendFailed => write!(f, "send failed"),
        }
    }
}

/// Result of delivering one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Transport confirmed the send
    Sent,
    /// Sample was dropped
    Dropped(DropReason),
}

impl DeliveryOutcome {
    /// Check if the sample went out
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

/// Lifecycle phase of a single delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    /// Nothing held
    Idle,
    /// Transmit buffer held, payload copied
    BufferAcquired,
    /// Connection open, buffer not yet handed over
    ConnectionOpen,
    /// Transport confirmed the send
    Sent,
    /// Send failed or timed out
    SendFailed,
    /// Connection closed
    Closed,
}

struct DeliveryAttempt {
    seq: u64,
    phase: DeliveryPhase,
}

impl DeliveryAttempt {
    fn new(seq: u64) -> Self {
        Self {
            seq,
            phase: DeliveryPhase::Idle,
        }
    }

    fn enter(&mut self, next: DeliveryPhase) {
        tracing::trace!(seq = self.seq, from = ?self.phase, to = ?next, "Delivery phase");
        self.phase = next;
    }

    fn drop_sample(mut self, reason: DropReason, terminal: DeliveryPhase) -> DeliveryOutcome {
        self.enter(terminal);
        tracing::debug!(seq = self.seq, reason = %reason, "Sample dropped");
        DeliveryOutcome::Dropped(reason)
    }
}

/// Deliver one sample over its own connection
///
/// Buffer ownership: the buffer is freed here if the open fails; once it is
/// passed to `send` the transport releases it. The connection is closed
/// exactly once, and only if it was opened.
pub async fn deliver<T: Transport>(
    transport: &T,
    policy: &DeliveryPolicy,
    sample: &TelemetrySample,
    seq: u64,
) -> DeliveryOutcome {
    let mut attempt = DeliveryAttempt::new(seq);

    let Some(mut buffer) = transport.allocate_buffer(SAMPLE_SIZE) else {
        return attempt.drop_sample(DropReason::BufferExhausted, DeliveryPhase::Idle);
    };

    if let Err(e) = buffer.write_payload(sample.as_bytes()) {
        tracing::warn!(seq = seq, error = %e, "Transport returned an undersized buffer");
        transport.free_buffer(buffer);
        return attempt.drop_sample(DropReason::BufferTooSmall, DeliveryPhase::Idle);
    }
    attempt.enter(DeliveryPhase::BufferAcquired);

    let mut conn = match transport
        .open(policy.destination, policy.timeout, policy.options)
        .await
    {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!(
                seq = seq,
                dest = %policy.destination,
                error = %e,
                "Connection open failed"
            );
            transport.free_buffer(buffer);
            return attempt.drop_sample(DropReason::ConnectFailed, DeliveryPhase::Idle);
        }
    };
    attempt.enter(DeliveryPhase::ConnectionOpen);

    let sent = transport.send(&mut conn, buffer, policy.timeout).await;
    transport.close(conn).await;

    match sent {
        Ok(()) => {
            attempt.enter(DeliveryPhase::Sent);
            attempt.enter(DeliveryPhase::Closed);
            tracing::trace!(seq = seq, topic = sample.topic_id, "Sample delivered");
            DeliveryOutcome::Sent
        }
        Err(e) => {
            attempt.enter(DeliveryPhase::SendFailed);
            tracing::debug!(seq = seq, error = %e, "Send failed");
            attempt.drop_sample(DropReason::SendFailed, DeliveryPhase::Closed)
        }
    }
}
