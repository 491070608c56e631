//! Status signaling
//!
//! Fire-and-forget liveness indication, typically LEDs on the board. The
//! relay signals its configured channels after each confirmed delivery.

use std::sync::Arc;

/// Identifier of a status output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusChannel(pub u8);

impl StatusChannel {
    /// Green indicator
    pub const GREEN: StatusChannel = StatusChannel(0);
    /// Orange indicator
    pub const ORANGE: StatusChannel = StatusChannel(1);
    /// Red indicator
    pub const RED: StatusChannel = StatusChannel(2);
    /// Blue indicator
    pub const BLUE: StatusChannel = StatusChannel(3);
}

impl std::fmt::Display for StatusChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            StatusChannel::GREEN => f.write_str("green"),
            StatusChannel::ORANGE => f.write_str("orange"),
            StatusChannel::RED => f.write_str("red"),
            StatusChannel::BLUE => f.write_str("blue"),
            StatusChannel(other) => write!(f, "channel-{}", other),
        }
    }
}

/// Sink for status signals
///
/// Implementations must not block; the relay calls this inline.
pub trait StatusSignal: Send + Sync {
    /// Pulse the given channel
    fn signal(&self, channel: StatusChannel);
}

impl<S: StatusSignal + ?Sized> StatusSignal for Arc<S> {
    fn signal(&self, channel: StatusChannel) {
        (**self).signal(channel)
    }
}

/// Emits a trace event per signal
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSignal;

impl StatusSignal for TracingSignal {
    fn signal(&self, channel: StatusChannel) {
        tracing::trace!(channel = %channel, "Status signal");
    }
}

/// Discards all signals
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignal;

impl StatusSignal for NoopSignal {
    fn signal(&self, _channel: StatusChannel) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_display() {
        assert_eq!(StatusChannel::RED.to_string(), "red");
        assert_eq!(StatusChannel::BLUE.to_string(), "blue");
        assert_eq!(StatusChannel(9).to_string(), "channel-9");
    }
}
