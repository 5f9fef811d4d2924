use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appsflyer_proxy::config::Settings;
use appsflyer_proxy::http::HttpServer;
use appsflyer_proxy::lifecycle::{shutdown_signal, Shutdown};
use appsflyer_proxy::observability::StatsdEmitter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appsflyer_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("appsflyer-proxy starting");

    // Load configuration; any missing or invalid value is fatal here,
    // before the socket is bound.
    let settings = Settings::from_env()?;
    tracing::info!(
        port = settings.port,
        route_prefix = %settings.route_prefix,
        endpoint = %settings.endpoint,
        metrics_enabled = settings.statsd.is_some(),
        "Settings loaded"
    );

    let emitter = settings
        .statsd
        .as_ref()
        .map(|s| StatsdEmitter::new(s.address.clone(), s.project.clone(), s.buffer));

    let server = HttpServer::new(&settings, emitter.as_ref().map(StatsdEmitter::client))?;

    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    // Translate OS termination signals into the drain trigger.
    let shutdown = Shutdown::new();
    let mut drain = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    // Keep the serve result until the emitter has flushed: even a fatal
    // server error must not abandon queued metrics.
    let served = server
        .run(listener, async move {
            let _ = drain.recv().await;
        })
        .await;

    // All handlers are done; flush whatever metrics are still queued.
    if let Some(emitter) = emitter {
        emitter.close().await;
    }

    served?;
    tracing::info!("Shutdown complete");
    Ok(())
}
