//! TCP transport
//!
//! One TCP connection per packet toward the logging node. Buffers come from a
//! fixed [`BufferPool`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::{Error, Result};

use super::buffer::{BufferPool, PoolStats, TransmitBuffer};
use super::config::{ConnectOptions, Priority, TransportConfig};
use super::traits::Transport;

/// Open TCP connection
#[derive(Debug)]
pub struct TcpConnection {
    id: u64,
    stream: TcpStream,
    peer_addr: SocketAddr,
    priority: Priority,
}

impl TcpConnection {
    /// Connection ID (unique per transport)
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Priority the connection was opened with
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

/// TCP implementation of [`Transport`]
pub struct TcpTransport {
    config: TransportConfig,
    pool: BufferPool,
    next_connection_id: AtomicU64,
    bytes_sent: AtomicU64,
}

impl TcpTransport {
    /// Create a transport with the given configuration
    pub fn new(config: TransportConfig) -> Self {
        let pool = BufferPool::new(config.pool_size, config.buffer_size);

        Self {
            config,
            pool,
            next_connection_id: AtomicU64::new(1),
            bytes_sent: AtomicU64::new(0),
        }
    }

    /// Get the transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Get the buffer pool
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Get buffer pool statistics
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Total payload bytes written
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    fn allocate_buffer(&self, size: usize) -> Option<TransmitBuffer> {
        self.pool.get(size)
    }

    async fn open(
        &self,
        destination: SocketAddr,
        timeout: Duration,
        options: ConnectOptions,
    ) -> Result<TcpConnection> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(destination))
            .await
            .map_err(|_| Error::ConnectTimeout(destination))??;

        self.configure_socket(&stream)?;

        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            connection_id = id,
            peer = %destination,
            priority = %options.priority,
            "Connection opened"
        );

        Ok(TcpConnection {
            id,
            stream,
            peer_addr: destination,
            priority: options.priority,
        })
    }

    async fn send(
        &self,
        conn: &mut TcpConnection,
        buffer: TransmitBuffer,
        timeout: Duration,
    ) -> Result<()> {
        let len = buffer.len();
        let write = async {
            conn.stream.write_all(buffer.as_bytes()).await?;
            conn.stream.flush().await
        };

        let result = tokio::time::timeout(timeout, write).await;
        // Transport owns the buffer from here; release it whatever the outcome
        drop(buffer);

        result.map_err(|_| Error::SendTimeout(conn.peer_addr))??;
        self.bytes_sent.fetch_add(len as u64, Ordering::Relaxed);

        tracing::trace!(connection_id = conn.id, bytes = len, "Packet sent");
        Ok(())
    }

    async fn close(&self, mut conn: TcpConnection) {
        if let Err(e) = conn.stream.shutdown().await {
            tracing::debug!(
                connection_id = conn.id,
                error = %e,
                "Shutdown failed"
            );
        }

        tracing::debug!(connection_id = conn.id, "Connection closed");
    }
}
