//! Request handling: authenticate, route, forward, relay.
//!
//! # Responsibilities
//! - Compare the inbound `authentication` header against the configured key
//! - Extract the app bundle id from the URL path
//! - Forward the request body to the upstream and relay its response
//!
//! # Design Decisions
//! - Expected faults are typed errors with their own status codes
//!   (auth → 401, route → 400, transport → 502); the panic layer only sees
//!   genuine programming errors
//! - A failed upstream body read is recovered locally: the error text
//!   becomes the relayed body, the upstream status is preserved

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::server::AppState;
use crate::upstream::UpstreamError;

/// Per-request error, mapped to a terminal response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The `authentication` header is absent or does not match.
    #[error("authentication header does not match")]
    Unauthorized,

    /// The path does not name exactly one app bundle id under the prefix.
    #[error("route is invalid: '{0}'")]
    MalformedRoute(String),

    /// The upstream could not be reached.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::MalformedRoute(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        (status, self.to_string()).into_response()
    }
}

/// Main proxy handler.
///
/// Authentication check, route validation, forward, and relay run strictly
/// in that order; the upstream is never contacted for a rejected request.
pub async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let provided = request
        .headers()
        .get("authentication")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !constant_time_eq(provided.as_bytes(), state.auth_key.as_bytes()) {
        if let Some(metrics) = &state.metrics {
            metrics.count("auth_failures", 1).await;
        }
        return Err(ProxyError::Unauthorized);
    }

    let path = request.uri().path().to_string();
    let app_bundle_id = parse_app_bundle_id(&path)?.to_string();
    let endpoint = state.forwarder.endpoint_for(&app_bundle_id);

    tracing::debug!(endpoint = %endpoint, "Forwarding request");

    let body = reqwest::Body::wrap_stream(request.into_body().into_data_stream());

    // Timed from here so the metric covers only the upstream exchange, not
    // auth or route parsing.
    let started = Instant::now();
    let upstream_response = match state.forwarder.forward(&app_bundle_id, body).await {
        Ok(response) => response,
        Err(e) => {
            if let Some(metrics) = &state.metrics {
                metrics.count("upstream_errors", 1).await;
            }
            return Err(e.into());
        }
    };

    let status = upstream_response.status();
    let body = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(
                endpoint = %endpoint,
                error = %e,
                "Failed to read upstream response body"
            );
            Bytes::from(format!("failed to read upstream response body: {e}"))
        }
    };

    if status.is_success() {
        tracing::info!(
            endpoint = %endpoint,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "Upstream response relayed"
        );
    } else {
        tracing::error!(
            endpoint = %endpoint,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "Upstream response is not ok"
        );
    }

    if let Some(metrics) = &state.metrics {
        metrics.count("requests", 1).await;
        metrics.time("upstream_time", started.elapsed()).await;
    }

    Ok((status, body).into_response())
}

/// Extract the app bundle id: the exact third segment of the path, which
/// must split on `/` into exactly three parts with a non-empty last one.
fn parse_app_bundle_id(path: &str) -> Result<&str, ProxyError> {
    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
        ["", _prefix, bundle_id] if !bundle_id.is_empty() => Ok(bundle_id),
        _ => Err(ProxyError::MalformedRoute(path.to_string())),
    }
}

/// Key comparison without an early exit on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}
