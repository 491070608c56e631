//! Bus configuration

/// Default per-subscriber queue depth
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Default maximum number of live subscriptions
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 8;

/// In-process bus configuration
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Samples buffered per subscriber before it starts lagging
    pub channel_capacity: usize,

    /// Maximum concurrent subscriptions
    pub max_subscribers: usize,

    /// Accept subscriptions immediately (otherwise wait for `open()`)
    pub start_ready: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_subscribers: DEFAULT_MAX_SUBSCRIBERS,
            start_ready: true,
        }
    }
}

impl BusConfig {
    /// Set the per-subscriber queue depth (at least 1)
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Set the maximum number of subscriptions
    pub fn max_subscribers(mut self, max: usize) -> Self {
        self.max_subscribers = max;
        self
    }

    /// Reject subscriptions until the bus is explicitly opened
    pub fn closed_until_ready(mut self) -> Self {
        self.start_ready = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BusConfig::default();

        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.max_subscribers, DEFAULT_MAX_SUBSCRIBERS);
        assert!(config.start_ready);
    }

    #[test]
    fn test_channel_capacity_floor() {
        let config = BusConfig::default().channel_capacity(0);

        assert_eq!(config.channel_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = BusConfig::default()
            .channel_capacity(16)
            .max_subscribers(2)
            .closed_until_ready();

        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.max_subscribers, 2);
        assert!(!config.start_ready);
    }
}
