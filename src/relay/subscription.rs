//! Subscription establishment
//!
//! The bus may not accept subscribers yet when the relay starts (its owner
//! initializes concurrently). The relay keeps asking on a fixed interval.

use tokio::time::Instant;

use crate::bus::{BusError, TelemetryBus, TopicMask};
use crate::error::{Error, Result};

use super::config::RetryPolicy;

/// Subscribe to `bus`, retrying per `policy` until it succeeds
///
/// `NotReady` and `SubscriberLimit` are retried. A closed bus will never
/// accept a subscriber, so it ends the wait with [`Error::BusClosed`].
/// With no `max_wait` this never gives up. Otherwise it returns
/// [`Error::SubscribeTimeout`] once the deadline has passed. The last sleep
/// is shortened so the deadline is not overshot.
pub async fn ensure_subscription<B: TelemetryBus>(
    bus: &B,
    mask: TopicMask,
    policy: &RetryPolicy,
) -> Result<B::Subscription> {
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let err = match bus.subscribe(mask).await {
            Ok(subscription) => {
                tracing::info!(mask = %mask, attempts = attempts, "Subscribed to telemetry bus");
                return Ok(subscription);
            }
            Err(BusError::Closed) => {
                tracing::info!(mask = %mask, attempts = attempts, "Telemetry bus closed, not subscribing");
                return Err(Error::BusClosed);
            }
            Err(e) => e,
        };

        let waited = started.elapsed();
        let delay = match policy.max_wait {
            Some(max) if waited >= max => {
                tracing::warn!(
                    mask = %mask,
                    attempts = attempts,
                    waited_ms = waited.as_millis() as u64,
                    error = %err,
                    "Giving up on telemetry subscription"
                );
                return Err(Error::SubscribeTimeout { attempts, waited });
            }
            Some(max) => policy.interval.min(max - waited),
            None => policy.interval,
        };

        tracing::debug!(
            attempt = attempts,
            error = %err,
            retry_in_ms = delay.as_millis() as u64,
            "Subscribe failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bus::TelemetrySubscription;
    use crate::testing::MockBus;

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_ready() {
        let bus = MockBus::with_samples(vec![]).failing_first(2);
        let policy = RetryPolicy::default();

        let started = Instant::now();
        let sub = ensure_subscription(&bus, TopicMask::ALL, &policy)
            .await
            .unwrap();

        assert_eq!(sub.mask(), TopicMask::ALL);
        assert_eq!(bus.attempts(), 3);
        // Exactly two retry delays
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed < Duration::from_millis(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_sleep() {
        let bus = MockBus::with_samples(vec![]);

        let started = Instant::now();
        ensure_subscription(&bus, TopicMask(0x3), &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(bus.attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_wait() {
        let bus = MockBus::with_samples(vec![]).failing_first(u32::MAX);
        let policy = RetryPolicy::default()
            .interval(Duration::from_millis(10))
            .max_wait(Duration::from_millis(30));

        let result = ensure_subscription(&bus, TopicMask::ALL, &policy).await;

        match result {
            Err(Error::SubscribeTimeout { attempts, waited }) => {
                assert_eq!(attempts, 4);
                assert!(waited >= Duration::from_millis(30));
            }
            other => panic!("expected SubscribeTimeout, got {:?}", other.err()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_shorter_than_interval() {
        let bus = MockBus::with_samples(vec![]).failing_first(u32::MAX);
        let policy = RetryPolicy::default()
            .interval(Duration::from_millis(100))
            .max_wait(Duration::from_millis(30));

        let started = Instant::now();
        let result = ensure_subscription(&bus, TopicMask::ALL, &policy).await;

        match result {
            Err(Error::SubscribeTimeout { attempts, waited }) => {
                assert_eq!(attempts, 2);
                assert!(waited >= Duration::from_millis(30));
            }
            other => panic!("expected SubscribeTimeout, got {:?}", other.err()),
        }
        // Woke at the deadline, not a full interval later
        assert!(started.elapsed() < Duration::from_millis(35));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_bus_is_not_retried() {
        let bus = MockBus::with_samples(vec![]).closed();

        let started = Instant::now();
        let result = ensure_subscription(&bus, TopicMask::ALL, &RetryPolicy::default()).await;

        assert!(matches!(result, Err(Error::BusClosed)));
        assert_eq!(bus.attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
