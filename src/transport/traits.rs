//! Transport contract consumed by the relay
//!
//! Mirrors a packet-oriented, connection-based transport with a buffer pool:
//! buffers are allocated from the pool, connections are opened to an address,
//! one buffer is sent per call, then the connection is closed.
//!
//! # Ownership
//!
//! - The caller owns a [`TransmitBuffer`] from `allocate_buffer` until it
//!   either passes it to `send` or hands it back with `free_buffer`.
//! - `send` takes the buffer by value. The transport releases it once the
//!   write completes or fails; the caller cannot touch it afterward.
//! - `open` returns a connection only on success. `close` consumes it.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::Result;

use super::buffer::TransmitBuffer;
use super::config::ConnectOptions;

/// Connection-oriented packet transport
pub trait Transport: Send + Sync {
    /// Open connection handle
    type Connection: Send;

    /// Take a transmit buffer of `size` bytes from the pool
    fn allocate_buffer(&self, size: usize) -> Option<TransmitBuffer>;

    /// Open a connection to `destination`
    fn open(
        &self,
        destination: SocketAddr,
        timeout: Duration,
        options: ConnectOptions,
    ) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Transmit one buffer over `conn`
    fn send(
        &self,
        conn: &mut Self::Connection,
        buffer: TransmitBuffer,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Close a connection
    fn close(&self, conn: Self::Connection) -> impl Future<Output = ()> + Send;

    /// Return an unsent buffer to the pool
    fn free_buffer(&self, buffer: TransmitBuffer) {
        drop(buffer);
    }
}
