//! Telemetry sample and topic types
//!
//! A sample is the fixed-size record producers publish on the bus. The relay
//! treats its payload as opaque bytes; only the topic id is inspected, and only
//! by the bus when filtering subscriptions.

use crate::error::{Error, Result};

/// Size in bytes of one serialized telemetry sample
pub const SAMPLE_SIZE: usize = 20;

/// Topic filter for a subscription
///
/// A mask of zero receives every sample. Otherwise a sample matches when its
/// topic id shares at least one bit with the mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TopicMask(pub u16);

impl TopicMask {
    /// Receive samples from all producers
    pub const ALL: TopicMask = TopicMask(0);

    /// Check whether a sample published under `topic_id` passes this filter
    pub fn matches(&self, topic_id: u16) -> bool {
        self.0 == 0 || topic_id & self.0 != 0
    }
}

impl std::fmt::Display for TopicMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// A single telemetry record read from the bus
///
/// Cheap to copy; the payload is a fixed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySample {
    /// Topic the producer published under
    pub topic_id: u16,
    payload: [u8; SAMPLE_SIZE],
}

impl TelemetrySample {
    /// Create a sample from a full payload
    pub fn new(topic_id: u16, payload: [u8; SAMPLE_SIZE]) -> Self {
        Self { topic_id, payload }
    }

    /// Create a sample from a byte slice
    ///
    /// The slice must be exactly [`SAMPLE_SIZE`] bytes long.
    pub fn from_slice(topic_id: u16, data: &[u8]) -> Result<Self> {
        let payload: [u8; SAMPLE_SIZE] = data
            .try_into()
            .map_err(|_| Error::InvalidSampleSize(data.len()))?;
        Ok(Self { topic_id, payload })
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length, always [`SAMPLE_SIZE`]
    pub const fn len(&self) -> usize {
        SAMPLE_SIZE
    }

    /// Always false; samples have a fixed, non-zero size
    pub const fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_mask_all() {
        assert!(TopicMask::ALL.matches(0));
        assert!(TopicMask::ALL.matches(0x0001));
        assert!(TopicMask::ALL.matches(0xFFFF));
    }

    #[test]
    fn test_topic_mask_bits() {
        let mask = TopicMask(0b0110);
        assert!(mask.matches(0b0010));
        assert!(mask.matches(0b0100));
        assert!(!mask.matches(0b1001));
        assert!(!mask.matches(0));
    }

    #[test]
    fn test_topic_mask_display() {
        assert_eq!(TopicMask(0x12).to_string(), "0x0012");
    }

    #[test]
    fn test_from_slice() {
        let data = [7u8; SAMPLE_SIZE];
        let sample = TelemetrySample::from_slice(3, &data).unwrap();
        assert_eq!(sample.topic_id, 3);
        assert_eq!(sample.as_bytes(), &data);
        assert_eq!(sample.len(), SAMPLE_SIZE);
    }

    #[test]
    fn test_from_slice_wrong_size() {
        let result = TelemetrySample::from_slice(1, &[0u8; 12]);
        assert!(matches!(result, Err(Error::InvalidSampleSize(12))));
    }
}
