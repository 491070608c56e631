//! Test doubles for the bus, transport and status collaborators

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::bus::{
    BusError, TelemetryBus, TelemetrySample, TelemetrySubscription, TopicMask, SAMPLE_SIZE,
};
use crate::error::{Error, Result};
use crate::status::{StatusChannel, StatusSignal};
use crate::transport::{BufferPool, ConnectOptions, PoolStats, TransmitBuffer, Transport};

pub(crate) fn sample(topic_id: u16, fill: u8) -> TelemetrySample {
    let mut payload = [fill; SAMPLE_SIZE];
    payload[0] = topic_id as u8;
    TelemetrySample::new(topic_id, payload)
}

/// Bus that rejects a fixed number of subscribe attempts, then serves a script
pub(crate) struct MockBus {
    closed: AtomicBool,
    failures_left: AtomicU32,
    attempts: AtomicU32,
    script: Mutex<VecDeque<std::result::Result<TelemetrySample, BusError>>>,
}

impl MockBus {
    pub(crate) fn new(reads: Vec<std::result::Result<TelemetrySample, BusError>>) -> Self {
        Self {
            closed: AtomicBool::new(false),
            failures_left: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
            script: Mutex::new(reads.into()),
        }
    }

    pub(crate) fn with_samples(samples: Vec<TelemetrySample>) -> Self {
        Self::new(samples.into_iter().map(Ok).collect())
    }

    pub(crate) fn failing_first(self, failures: u32) -> Self {
        self.failures_left.store(failures, Ordering::SeqCst);
        self
    }

    /// Every subscribe attempt reports the bus as shut down
    pub(crate) fn closed(self) -> Self {
        self.closed.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn try_subscribe(&self, mask: TopicMask) -> std::result::Result<MockSubscription, BusError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }

        let rejected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(BusError::NotReady);
        }

        let reads = std::mem::take(&mut *self.script.lock().unwrap());
        Ok(MockSubscription { reads, mask })
    }
}

impl TelemetryBus for MockBus {
    type Subscription = MockSubscription;

    async fn subscribe(&self, mask: TopicMask) -> std::result::Result<MockSubscription, BusError> {
        self.try_subscribe(mask)
    }
}

pub(crate) struct MockSubscription {
    reads: VecDeque<std::result::Result<TelemetrySample, BusError>>,
    mask: TopicMask,
}

impl TelemetrySubscription for MockSubscription {
    fn mask(&self) -> TopicMask {
        self.mask
    }

    async fn read(&mut self) -> std::result::Result<TelemetrySample, BusError> {
        self.reads.pop_front().unwrap_or(Err(BusError::Closed))
    }
}

/// Calls observed by [`MockTransport`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Allocate,
    /// Connection id on success, None on failure
    Open(Option<u64>),
    Send(u64, Vec<u8>),
    Close(u64),
    Free,
}

pub(crate) struct MockConnection {
    id: u64,
    destination: SocketAddr,
}

/// Transport that records every call and fails on request
///
/// Each script holds one entry per call; `false` makes that call fail.
/// An empty script means success.
pub(crate) struct MockTransport {
    pool: BufferPool,
    /// Hand out buffers of this size regardless of the request
    buffer_len: Option<usize>,
    events: Mutex<Vec<Event>>,
    allocations: Mutex<VecDeque<bool>>,
    opens: Mutex<VecDeque<bool>>,
    sends: Mutex<VecDeque<bool>>,
    next_id: AtomicU64,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            pool: BufferPool::new(4, SAMPLE_SIZE),
            buffer_len: None,
            events: Mutex::new(Vec::new()),
            allocations: Mutex::new(VecDeque::new()),
            opens: Mutex::new(VecDeque::new()),
            sends: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn allocations(self, script: &[bool]) -> Self {
        *self.allocations.lock().unwrap() = script.iter().copied().collect();
        self
    }

    pub(crate) fn opens(self, script: &[bool]) -> Self {
        *self.opens.lock().unwrap() = script.iter().copied().collect();
        self
    }

    pub(crate) fn sends(self, script: &[bool]) -> Self {
        *self.sends.lock().unwrap() = script.iter().copied().collect();
        self
    }

    /// Misbehave by returning buffers of `len` bytes for every allocation
    pub(crate) fn buffer_len(mut self, len: usize) -> Self {
        self.buffer_len = Some(len);
        self
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn next_ok(script: &Mutex<VecDeque<bool>>) -> bool {
        script.lock().unwrap().pop_front().unwrap_or(true)
    }
}

impl Transport for MockTransport {
    type Connection = MockConnection;

    fn allocate_buffer(&self, size: usize) -> Option<TransmitBuffer> {
        self.record(Event::Allocate);
        if Self::next_ok(&self.allocations) {
            self.pool.get(self.buffer_len.unwrap_or(size))
        } else {
            None
        }
    }

    async fn open(
        &self,
        destination: SocketAddr,
        _timeout: Duration,
        _options: ConnectOptions,
    ) -> Result<MockConnection> {
        if Self::next_ok(&self.opens) {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.record(Event::Open(Some(id)));
            Ok(MockConnection { id, destination })
        } else {
            self.record(Event::Open(None));
            Err(Error::ConnectTimeout(destination))
        }
    }

    async fn send(
        &self,
        conn: &mut MockConnection,
        buffer: TransmitBuffer,
        _timeout: Duration,
    ) -> Result<()> {
        self.record(Event::Send(conn.id, buffer.as_bytes().to_vec()));
        drop(buffer);

        if Self::next_ok(&self.sends) {
            Ok(())
        } else {
            Err(Error::SendTimeout(conn.destination))
        }
    }

    async fn close(&self, conn: MockConnection) {
        self.record(Event::Close(conn.id));
    }

    fn free_buffer(&self, buffer: TransmitBuffer) {
        self.record(Event::Free);
        drop(buffer);
    }
}

/// Status sink remembering every signal
#[derive(Default)]
pub(crate) struct RecordingSignal {
    signals: Mutex<Vec<StatusChannel>>,
}

impl RecordingSignal {
    pub(crate) fn signals(&self) -> Vec<StatusChannel> {
        self.signals.lock().unwrap().clone()
    }
}

impl StatusSignal for RecordingSignal {
    fn signal(&self, channel: StatusChannel) {
        self.signals.lock().unwrap().push(channel);
    }
}
