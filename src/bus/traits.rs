//! Bus contract consumed by the relay
//!
//! Any publish/subscribe mechanism that can hand out filtered subscriptions
//! and a suspending read can feed the relay. [`super::InProcessBus`] is the
//! bundled implementation.

use std::future::Future;

use super::error::BusError;
use super::sample::{TelemetrySample, TopicMask};

/// Source of telemetry subscriptions
///
/// Must be safe to share between tasks; the relay is one reader among several.
pub trait TelemetryBus: Send + Sync {
    /// Subscription handle type
    type Subscription: TelemetrySubscription;

    /// Register a subscriber for samples matching `mask`
    ///
    /// A failure here is transient from the relay's point of view and is
    /// retried by [`crate::relay::ensure_subscription`].
    fn subscribe(
        &self,
        mask: TopicMask,
    ) -> impl Future<Output = Result<Self::Subscription, BusError>> + Send;
}

/// A standing registration on the bus
pub trait TelemetrySubscription: Send {
    /// The filter this subscription was created with
    fn mask(&self) -> TopicMask;

    /// Wait for the next matching sample
    ///
    /// Suspends until a sample is available. Returns [`BusError::Lagged`]
    /// when samples were missed and [`BusError::Closed`] once the bus is gone.
    fn read(&mut self) -> impl Future<Output = Result<TelemetrySample, BusError>> + Send;
}
