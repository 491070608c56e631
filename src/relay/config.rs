//! Relay configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::bus::TopicMask;
use crate::status::StatusChannel;
use crate::transport::{ConnectOptions, Priority};

use super::delivery::DeliveryPolicy;

/// Default logging node port
pub const DEFAULT_LOG_NODE_PORT: u16 = 4510;

/// Default timeout for each connect and send
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(100);

/// Default delay between subscribe attempts
pub const DEFAULT_SUBSCRIBE_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// How to retry bus subscription at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between attempts
    pub interval: Duration,

    /// Give up after this long (None = retry forever)
    pub max_wait: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SUBSCRIBE_RETRY_INTERVAL,
            max_wait: None,
        }
    }
}

impl RetryPolicy {
    /// Set the delay between attempts
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Give up after `max_wait`
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Retry without a deadline
    pub fn forever(mut self) -> Self {
        self.max_wait = None;
        self
    }
}

/// Relay task configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Logging node address
    pub destination: SocketAddr,

    /// Which producers to subscribe to
    pub topic_mask: TopicMask,

    /// Timeout for each connect and each send
    pub operation_timeout: Duration,

    /// Options passed to every connection open
    pub connect_options: ConnectOptions,

    /// Subscription retry behavior
    pub subscribe_retry: RetryPolicy,

    /// Channels pulsed after each confirmed delivery, in order
    pub status_channels: Vec<StatusChannel>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            destination: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_LOG_NODE_PORT),
            topic_mask: TopicMask::ALL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            connect_options: ConnectOptions::default(),
            subscribe_retry: RetryPolicy::default(),
            status_channels: vec![StatusChannel::RED, StatusChannel::BLUE],
        }
    }
}

impl RelayConfig {
    /// Create a config targeting `destination`
    pub fn with_destination(destination: SocketAddr) -> Self {
        Self {
            destination,
            ..Default::default()
        }
    }

    /// Set the logging node address
    pub fn destination(mut self, addr: SocketAddr) -> Self {
        self.destination = addr;
        self
    }

    /// Set the subscription topic mask
    pub fn topic_mask(mut self, mask: TopicMask) -> Self {
        self.topic_mask = mask;
        self
    }

    /// Set the connect/send timeout
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set the connection priority
    pub fn priority(mut self, priority: Priority) -> Self {
        self.connect_options = self.connect_options.priority(priority);
        self
    }

    /// Set the subscription retry policy
    pub fn subscribe_retry(mut self, policy: RetryPolicy) -> Self {
        self.subscribe_retry = policy;
        self
    }

    /// Set the channels signaled on delivery
    pub fn status_channels(mut self, channels: impl Into<Vec<StatusChannel>>) -> Self {
        self.status_channels = channels.into();
        self
    }

    /// Per-sample delivery parameters
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            destination: self.destination,
            timeout: self.operation_timeout,
            options: self.connect_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.destination.port(), DEFAULT_LOG_NODE_PORT);
        assert!(config.destination.ip().is_loopback());
        assert_eq!(config.topic_mask, TopicMask::ALL);
        assert_eq!(config.operation_timeout, Duration::from_millis(100));
        assert_eq!(config.connect_options.priority, Priority::Normal);
        assert_eq!(config.subscribe_retry.interval, Duration::from_millis(5));
        assert!(config.subscribe_retry.max_wait.is_none());
        assert_eq!(
            config.status_channels,
            vec![StatusChannel::RED, StatusChannel::BLUE]
        );
    }

    #[test]
    fn test_retry_policy_builders() {
        let policy = RetryPolicy::default()
            .interval(Duration::from_millis(50))
            .max_wait(Duration::from_secs(2));
        assert_eq!(policy.interval, Duration::from_millis(50));
        assert_eq!(policy.max_wait, Some(Duration::from_secs(2)));

        assert!(policy.forever().max_wait.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "192.168.1.20:9000".parse().unwrap();
        let config = RelayConfig::default()
            .destination(addr)
            .topic_mask(TopicMask(0x4))
            .operation_timeout(Duration::from_millis(250))
            .priority(Priority::High)
            .status_channels([StatusChannel::GREEN]);

        assert_eq!(config.destination, addr);
        assert_eq!(config.topic_mask, TopicMask(0x4));
        assert_eq!(config.operation_timeout, Duration::from_millis(250));
        assert_eq!(config.connect_options.priority, Priority::High);
        assert_eq!(config.status_channels, vec![StatusChannel::GREEN]);
    }

    #[test]
    fn test_delivery_policy() {
        let addr: SocketAddr = "10.0.0.2:4510".parse().unwrap();
        let policy = RelayConfig::with_destination(addr).delivery_policy();

        assert_eq!(policy.destination, addr);
        assert_eq!(policy.timeout, DEFAULT_OPERATION_TIMEOUT);
        assert_eq!(policy.options, ConnectOptions::default());
    }
}
