//! In-process telemetry bus
//!
//! Fans samples out from any number of producer tasks to a bounded set of
//! subscribers through a `tokio::sync::broadcast` channel.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};

use super::config::BusConfig;
use super::error::BusError;
use super::sample::{TelemetrySample, TopicMask};
use super::traits::{TelemetryBus, TelemetrySubscription};

struct BusInner {
    /// Broadcast sender (None once the bus is closed)
    tx: RwLock<Option<broadcast::Sender<TelemetrySample>>>,

    /// Whether subscriptions are accepted
    ready: AtomicBool,

    /// Number of live subscriptions
    subscriber_count: AtomicUsize,

    /// Total samples published
    published: AtomicU64,

    config: BusConfig,
}

/// Bus statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusStats {
    /// Number of live subscriptions
    pub subscriber_count: usize,
    /// Total samples published
    pub published: u64,
    /// Whether the bus accepts subscriptions
    pub ready: bool,
    /// Whether the bus has been closed
    pub closed: bool,
}

/// In-process publish/subscribe bus for telemetry samples
///
/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct InProcessBus {
    inner: Arc<BusInner>,
}

impl InProcessBus {
    /// Create a new bus with default configuration
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a new bus with custom configuration
    pub fn with_config(config: BusConfig) -> Self {
        let (tx, _) = broadcast::channel(config.channel_capacity);

        Self {
            inner: Arc::new(BusInner {
                tx: RwLock::new(Some(tx)),
                ready: AtomicBool::new(config.start_ready),
                subscriber_count: AtomicUsize::new(0),
                published: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Get the bus configuration
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Start accepting subscriptions
    pub fn open(&self) {
        self.inner.ready.store(true, Ordering::Release);
        tracing::info!("Telemetry bus open");
    }

    /// Publish a sample to all subscribers
    ///
    /// Returns the number of subscribers the sample was queued for, 0 if
    /// there are none or the bus is closed.
    pub async fn publish(&self, sample: TelemetrySample) -> usize {
        let tx = self.inner.tx.read().await;

        match tx.as_ref() {
            Some(tx) => {
                self.inner.published.fetch_add(1, Ordering::Relaxed);
                // send() errors only when there are no receivers
                tx.send(sample).unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Shut the bus down
    ///
    /// Subscribers drain what is already queued, then read [`BusError::Closed`].
    pub async fn close(&self) {
        let mut tx = self.inner.tx.write().await;
        if tx.take().is_some() {
            self.inner.ready.store(false, Ordering::Release);
            tracing::info!(
                subscribers = self.subscriber_count(),
                "Telemetry bus closed"
            );
        }
    }

    /// Get the number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count.load(Ordering::Relaxed)
    }

    /// Get bus statistics
    pub async fn stats(&self) -> BusStats {
        let closed = self.inner.tx.read().await.is_none();

        BusStats {
            subscriber_count: self.subscriber_count(),
            published: self.inner.published.load(Ordering::Relaxed),
            ready: self.inner.ready.load(Ordering::Acquire),
            closed,
        }
    }

    fn reserve_slot(&self) -> Result<(), BusError> {
        let max = self.inner.config.max_subscribers;

        self.inner
            .subscriber_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max).then_some(count + 1)
            })
            .map(|_| ())
            .map_err(|_| BusError::SubscriberLimit(max))
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryBus for InProcessBus {
    type Subscription = BusSubscription;

    async fn subscribe(&self, mask: TopicMask) -> Result<BusSubscription, BusError> {
        let tx = self.inner.tx.read().await;
        let tx = tx.as_ref().ok_or(BusError::Closed)?;

        if !self.inner.ready.load(Ordering::Acquire) {
            return Err(BusError::NotReady);
        }

        self.reserve_slot()?;
        let rx = tx.subscribe();

        tracing::info!(
            mask = %mask,
            subscribers = self.subscriber_count(),
            "Subscriber added"
        );

        Ok(BusSubscription {
            rx,
            mask,
            inner: Arc::clone(&self.inner),
        })
    }
}

/// Subscription to an [`InProcessBus`]
///
/// Dropping it frees the subscriber slot.
pub struct BusSubscription {
    rx: broadcast::Receiver<TelemetrySample>,
    mask: TopicMask,
    inner: Arc<BusInner>,
}

impl TelemetrySubscription for BusSubscription {
    fn mask(&self) -> TopicMask {
        self.mask
    }

    async fn read(&mut self) -> Result<TelemetrySample, BusError> {
        loop {
            match self.rx.recv().await {
                Ok(sample) if self.mask.matches(sample.topic_id) => return Ok(sample),
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => return Err(BusError::Lagged(missed)),
                Err(RecvError::Closed) => return Err(BusError::Closed),
            }
        }
    }
}

impl Drop for BusSubscription {
    fn drop(&mut self) {
        let prev = self.inner.subscriber_count.fetch_sub(1, Ordering::AcqRel);

        tracing::debug!(
            mask = %self.mask,
            subscribers = prev.saturating_sub(1),
            "Subscriber removed"
        );
    }
}
