//! Telemetry relay
//!
//! Forwards telemetry samples from an in-process publish/subscribe bus to a
//! downstream logging node, one short-lived connection per sample.
//!
//! # Example
//!
//! ```no_run
//! use telemetry_relay::bus::InProcessBus;
//! use telemetry_relay::relay::{RelayConfig, TelemetryRelay};
//! use telemetry_relay::status::TracingSignal;
//! use telemetry_relay::transport::TcpTransport;
//!
//! # async fn example() -> telemetry_relay::Result<()> {
//! let bus = InProcessBus::new();
//! let config = RelayConfig::with_destination("10.0.0.7:4510".parse().unwrap());
//! let relay = TelemetryRelay::new(bus.clone(), TcpTransport::default(), TracingSignal, config);
//!
//! // Producers publish on `bus`; the relay runs until the bus closes
//! relay.run().await
//! # }
//! ```

pub mod bus;
pub mod error;
pub mod relay;
pub mod status;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use bus::{InProcessBus, TelemetrySample, TopicMask};
pub use error::{Error, Result};
pub use relay::{RelayConfig, TelemetryRelay};
pub use transport::TcpTransport;
