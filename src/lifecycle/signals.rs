//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGQUIT)
//! - Resolve when any of them fires, so the caller can trigger drain
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - All three signals mean the same thing: graceful drain

/// Wait for any registered termination signal.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    let mut quit = signal(SignalKind::quit()).expect("Failed to install SIGQUIT handler");
    let mut interrupt =
        signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");

    let received = tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
        _ = interrupt.recv() => "SIGINT",
    };

    tracing::info!(signal = received, "Termination signal received");
}

/// Wait for Ctrl+C on platforms without Unix signals.
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Termination signal received");
}
