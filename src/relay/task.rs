//! Relay task
//!
//! Subscribes once, then forwards every sample read from the bus to the
//! logging node, one connection per sample.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::bus::{BusError, TelemetryBus, TelemetrySubscription};
use crate::error::Result;
use crate::status::StatusSignal;
use crate::transport::Transport;

use super::config::RelayConfig;
use super::delivery::deliver;
use super::stats::RelayStats;
use super::subscription::ensure_subscription;

/// Telemetry relay
///
/// Owns its collaborators; pass cloned handles (e.g. of an
/// [`crate::bus::InProcessBus`]) to keep publishing from elsewhere.
pub struct TelemetryRelay<B, T, S> {
    bus: B,
    transport: T,
    signal: S,
    config: RelayConfig,
    stats: Arc<RelayStats>,
}

impl<B, T, S> TelemetryRelay<B, T, S>
where
    B: TelemetryBus,
    T: Transport,
    S: StatusSignal,
{
    /// Create a relay
    pub fn new(bus: B, transport: T, signal: S, config: RelayConfig) -> Self {
        Self {
            bus,
            transport,
            signal,
            config,
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// Get the relay configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Get a handle to the live counters
    pub fn stats(&self) -> Arc<RelayStats> {
        Arc::clone(&self.stats)
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the relay
    ///
    /// Subscribes (retrying per the configured policy), then forwards samples
    /// indefinitely. Returns only if the subscription deadline passes or the
    /// bus shuts down.
    pub async fn run(&self) -> Result<()> {
        let mut subscription = ensure_subscription(
            &self.bus,
            self.config.topic_mask,
            &self.config.subscribe_retry,
        )
        .await?;

        tracing::info!(
            dest = %self.config.destination,
            mask = %subscription.mask(),
            "Telemetry relay started"
        );

        self.forward_loop(&mut subscription).await
    }

    /// Run the relay until `shutdown` completes
    ///
    /// Whatever is in flight at that moment is abandoned.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.run() => result,
        }
    }

    async fn forward_loop(&self, subscription: &mut B::Subscription) -> Result<()> {
        let policy = self.config.delivery_policy();
        let mut seq: u64 = 0;

        loop {
            let sample = match subscription.read().await {
                Ok(sample) => sample,
                Err(BusError::Lagged(missed)) => {
                    tracing::warn!(missed = missed, "Relay lagged behind telemetry bus");
                    self.stats.record_lagged(missed);
                    continue;
                }
                Err(e) => {
                    tracing::info!(error = %e, sent = self.stats.snapshot().sent, "Telemetry relay stopped");
                    return Err(e.into());
                }
            };

            seq += 1;
            self.stats.record_read();

            let outcome = deliver(&self.transport, &policy, &sample, seq).await;
            self.stats.record_outcome(outcome);

            if outcome.is_sent() {
                for &channel in &self.config.status_channels {
                    self.signal.signal(channel);
                }
            }
        }
    }
}

impl<B, T, S> TelemetryRelay<B, T, S>
where
    B: TelemetryBus + 'static,
    B::Subscription: 'static,
    T: Transport + 'static,
    S: StatusSignal + 'static,
{
    /// Spawn the relay as a tokio task
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
