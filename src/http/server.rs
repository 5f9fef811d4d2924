//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router for the single proxied route
//! - Wire up middleware (panic isolation, tracing, in-flight tracking)
//! - Serve connections until the shutdown future resolves
//! - Drain in-flight requests before returning
//!
//! # Design Decisions
//! - Panic isolation is the outermost layer: exactly one response is
//!   written per request, even when a handler panics
//! - The in-flight guard is taken before dispatch and released on drop, so
//!   the counter is exact across success, rejection, and panic
//! - Paths outside the configured prefix are 404s; everything under it is
//!   routed to the handler, which decides malformed vs. well-formed

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::http::handler::proxy_handler;
use crate::lifecycle::InFlightTracker;
use crate::observability::StatsdClient;
use crate::upstream::{Forwarder, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Key clients must present in the `authentication` header.
    pub auth_key: Arc<str>,
    /// Outbound client for the upstream API.
    pub forwarder: Arc<Forwarder>,
    /// Counter gating graceful shutdown.
    pub in_flight: InFlightTracker,
    /// Metrics producer, when a collector is configured.
    pub metrics: Option<StatsdClient>,
}

/// HTTP server for the event proxy.
pub struct HttpServer {
    router: Router,
    in_flight: InFlightTracker,
}

impl HttpServer {
    /// Create a new server from validated settings.
    pub fn new(settings: &Settings, metrics: Option<StatsdClient>) -> Result<Self, UpstreamError> {
        let forwarder = Forwarder::new(settings.endpoint.clone(), settings.dev_key.clone())?;
        let in_flight = InFlightTracker::new();

        let state = AppState {
            auth_key: Arc::from(settings.auth_key.as_str()),
            forwarder: Arc::new(forwarder),
            in_flight: in_flight.clone(),
            metrics,
        };

        let router = Self::build_router(&settings.route_prefix, state);
        Ok(Self { router, in_flight })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(route_prefix: &str, state: AppState) -> Router {
        // Three registrations so that both the bare prefix and a trailing
        // slash reach the handler's segment validation instead of a 404.
        Router::new()
            .route(&format!("/{route_prefix}"), post(proxy_handler))
            .route(&format!("/{route_prefix}/"), post(proxy_handler))
            .route(&format!("/{route_prefix}/{{*rest}}"), post(proxy_handler))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                track_in_flight,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
            .with_state(state)
    }

    /// Run the server until `shutdown` resolves, then drain.
    ///
    /// Once `shutdown` fires the listener closes immediately; connections
    /// already accepted keep running until the in-flight counter hits zero.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        // A fatal serve error drains exactly like a signal: requests that
        // were accepted before the failure still complete.
        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Err(e) = &served {
            tracing::error!(error = %e, "HTTP server failed, draining before exit");
        }

        tracing::info!(
            in_flight = self.in_flight.active(),
            "Listener closed, draining in-flight requests"
        );
        self.in_flight.wait_idle().await;
        tracing::info!("Drain complete, HTTP server stopped");

        served
    }
}

/// Hold an in-flight guard across dispatch; released on drop, panic included.
async fn track_in_flight(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let _guard = state.in_flight.track();
    next.run(request).await
}

/// Convert a caught panic into a 500 response instead of tearing down the
/// connection task.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, detail).into_response()
}
