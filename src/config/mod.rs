//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → settings.rs (read & parse variables)
//!     → semantic checks (non-empty keys, port > 0)
//!     → Settings (validated, immutable)
//!     → shared with the server at startup
//! ```
//!
//! # Design Decisions
//! - Environment-only configuration; no config files, no hot reload
//! - All required values validated before the listener is bound (fail fast)
//! - Lookup is injected so tests never mutate process environment

pub mod settings;

pub use settings::{ConfigError, Settings, StatsdSettings};
