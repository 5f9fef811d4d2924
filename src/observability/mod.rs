//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler produces:
//!     → tracing events (structured logs, stdout)
//!     → statsd.rs (counters, timers, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → StatsD collector (one UDP datagram per record)
//! ```
//!
//! # Design Decisions
//! - Metrics delivery is best effort; a dead collector costs nothing
//! - Producers never wait on the network, only on queue capacity
//! - Logging uses the tracing crate, initialized once in main

pub mod statsd;

pub use statsd::{StatsdClient, StatsdEmitter};
