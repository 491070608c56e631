//! Network transport toward the logging node
//!
//! The relay talks to the network only through the [`Transport`] trait.
//! [`TcpTransport`] opens one TCP connection per packet and stages payloads
//! in a fixed [`BufferPool`].

pub mod buffer;
pub mod config;
pub mod tcp;
pub mod traits;

pub use buffer::{BufferPool, PoolStats, TransmitBuffer};
pub use config::{ConnectOptions, Priority, TransportConfig};
pub use tcp::{TcpConnection, TcpTransport};
pub use traits::Transport;
