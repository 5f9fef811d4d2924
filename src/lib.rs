//! AppsFlyer Event Proxy
//!
//! A single-endpoint HTTP proxy that authenticates inbound event-tracking
//! calls, forwards them to the AppsFlyer in-app event API, and relays the
//! upstream response verbatim.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌─────────────────────────────────────────────────┐
//!                    │                  EVENT PROXY                    │
//!                    │                                                 │
//!   Client Request   │  ┌──────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│  panic   │──▶│ request  │──▶│  upstream  │──┼──▶ AppsFlyer
//!                    │  │isolation │   │ handler  │   │ forwarder  │  │    API
//!                    │  └──────────┘   └────┬─────┘   └────────────┘  │
//!                    │                      │                         │
//!                    │                      ▼                         │
//!                    │               ┌────────────┐                   │
//!   StatsD collector │◀──────────────│   statsd   │                   │
//!                    │     UDP       │  emitter   │                   │
//!                    │               └────────────┘                   │
//!                    │                                                 │
//!                    │  ┌───────────────────────────────────────────┐ │
//!                    │  │               lifecycle                   │ │
//!                    │  │  signals → shutdown trigger → drain       │ │
//!                    │  └───────────────────────────────────────────┘ │
//!                    └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::Settings;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
