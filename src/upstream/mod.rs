//! Upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler
//!     → forwarder.rs (build POST <base>/<bundle-id>, stream body through)
//!     → AppsFlyer in-app event API
//!     → upstream response handed back for relay
//! ```
//!
//! # Design Decisions
//! - Dedicated client: one idle connection, one-minute idle timeout,
//!   one-minute request timeout
//! - Compression disabled end-to-end so the relay stays byte-exact
//! - Transport faults are typed errors, mapped to 502 by the handler

pub mod forwarder;

pub use forwarder::{Forwarder, UpstreamError};
