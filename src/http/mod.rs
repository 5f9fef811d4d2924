//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, panic isolation, in-flight tracking)
//!     → handler.rs (authenticate, extract bundle id, forward, relay)
//!     → upstream response written back to client
//! ```

pub mod handler;
pub mod server;

pub use server::{AppState, HttpServer};
