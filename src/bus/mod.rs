//! Telemetry bus
//!
//! The bus is where producer tasks (sensor readers, the aggregator) publish
//! fixed-size samples and where the relay picks them up.
//!
//! # Architecture
//!
//! ```text
//!   [Producer]      [Producer]
//!   publish()       publish()
//!        │               │
//!        └──────┬────────┘
//!               ▼
//!      InProcessBus (broadcast::Tx)
//!               │
//!       ┌───────┴────────┐
//!       ▼                ▼
//!  BusSubscription  BusSubscription
//!  (mask filter)    (mask filter)
//!       │
//!       └──► TelemetryRelay ──► Transport
//! ```
//!
//! The relay only depends on the [`TelemetryBus`] and
//! [`TelemetrySubscription`] traits, so other buses can be plugged in.

pub mod config;
pub mod error;
pub mod sample;
pub mod store;
pub mod traits;

pub use config::BusConfig;
pub use error::BusError;
pub use sample::{TelemetrySample, TopicMask, SAMPLE_SIZE};
pub use store::{BusStats, BusSubscription, InProcessBus};
pub use traits::{TelemetryBus, TelemetrySubscription};
