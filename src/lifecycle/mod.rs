//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load settings → Bind listener → Serve
//!
//! Shutdown:
//!     Signal received → Stop accepting → Drain in-flight → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM / SIGINT / SIGQUIT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain in-flight requests, close
//! - Every dispatched request holds an in-flight guard for its lifetime
//! - No mid-flight cancellation: drain waits for the slowest request,
//!   itself bounded by the upstream client timeout

pub mod shutdown;
pub mod signals;

pub use shutdown::{InFlightGuard, InFlightTracker, Shutdown};
pub use signals::shutdown_signal;
