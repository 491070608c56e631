//! Transport configuration

use crate::bus::SAMPLE_SIZE;

/// Default transmit buffer size (one serialized sample)
pub const DEFAULT_BUFFER_SIZE: usize = SAMPLE_SIZE;

/// Default number of transmit buffers in the pool
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Connection priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Critical traffic
    Critical,
    /// High priority
    High,
    /// Normal priority
    #[default]
    Normal,
    /// Bulk / low priority
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        };
        f.write_str(name)
    }
}

/// Per-connection options passed to `Transport::open`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Connection priority
    pub priority: Priority,
}

impl ConnectOptions {
    /// Set the connection priority
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// TCP transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Capacity of each transmit buffer in bytes
    pub buffer_size: usize,

    /// Number of transmit buffers in the pool
    pub pool_size: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            pool_size: DEFAULT_POOL_SIZE,
            tcp_nodelay: true, // one small packet per connection
        }
    }
}

impl TransportConfig {
    /// Set the transmit buffer size
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the number of pooled buffers
    pub fn pool_size(mut self, count: usize) -> Self {
        self.pool_size = count;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}
