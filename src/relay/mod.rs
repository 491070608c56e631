//! Telemetry relay
//!
//! The relay is a single sequential task:
//!
//! ```text
//!   ensure_subscription() ── retry every 5 ms ──┐
//!            │                                  │
//!            ▼                                  │
//!   ┌──► subscription.read() ◄──────────────────┘
//!   │        │
//!   │        ▼
//!   │    deliver(): buffer → open → send → close
//!   │        │
//!   │        ▼
//!   │    Sent? ── signal status channels
//!   └────────┘
//! ```
//!
//! Forwarding is best-effort: a sample that cannot get a buffer, a
//! connection, or a confirmed send is dropped and the loop moves on.

pub mod config;
pub mod delivery;
pub mod stats;
pub mod subscription;
pub mod task;

pub use config::{RelayConfig, RetryPolicy};
pub use delivery::{deliver, DeliveryOutcome, DeliveryPhase, DeliveryPolicy, DropReason};
pub use stats::{RelayStats, RelayStatsSnapshot};
pub use subscription::ensure_subscription;
pub use task::TelemetryRelay;
