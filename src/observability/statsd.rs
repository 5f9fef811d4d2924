//! Fire-and-forget StatsD emission over UDP.
//!
//! # Responsibilities
//! - Format counter/timer/gauge records (`<project>.<metric>:<value>|<tag>`)
//! - Queue records through a bounded channel
//! - Drain the queue from a single background task, one datagram per record
//!
//! # Design Decisions
//! - Send failures are silently discarded: no retry, no backpressure signal
//! - Producers block only when the queue is full; the bounded buffer is the
//!   sole coupling between request handling and collector availability
//! - Closing the emitter closes the queue; the sender drains what is
//!   buffered and terminates

use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Owner of the metric queue and its background sender task.
///
/// Cheap [`StatsdClient`] handles are cloned out to request handlers; the
/// emitter itself stays with the process lifecycle so it can be closed and
/// drained at shutdown.
pub struct StatsdEmitter {
    client: StatsdClient,
    sender: JoinHandle<()>,
}

/// Producer handle for emitting metrics.
#[derive(Clone)]
pub struct StatsdClient {
    project: Arc<str>,
    tx: mpsc::Sender<String>,
}

impl StatsdEmitter {
    /// Create an emitter shipping records to `address` (`host:port`), with
    /// metric names prefixed by `project` and a queue of `buffer` records.
    pub fn new(address: impl Into<String>, project: impl Into<String>, buffer: usize) -> Self {
        let (tx, rx) = mpsc::channel(buffer);
        let address = address.into();
        let sender = tokio::spawn(sender_loop(address, rx));

        Self {
            client: StatsdClient {
                project: Arc::from(project.into()),
                tx,
            },
            sender,
        }
    }

    /// Clone a producer handle for request handlers.
    pub fn client(&self) -> StatsdClient {
        self.client.clone()
    }

    /// Close the queue and wait for the sender to drain buffered records.
    ///
    /// Any [`StatsdClient`] clones must be dropped first, or the queue stays
    /// open and the sender keeps waiting.
    pub async fn close(self) {
        let Self { client, sender } = self;
        drop(client);
        if let Err(e) = sender.await {
            tracing::warn!(error = %e, "StatsD sender task failed");
        }
    }
}

impl StatsdClient {
    /// Emit a counter increment.
    pub async fn count(&self, metric: &str, value: i64) {
        self.enqueue(format_record(&self.project, metric, value, "c"))
            .await;
    }

    /// Emit a timing, in whole milliseconds.
    pub async fn time(&self, metric: &str, took: Duration) {
        self.enqueue(format_record(&self.project, metric, took.as_millis() as i64, "ms"))
            .await;
    }

    /// Emit a gauge value.
    pub async fn gauge(&self, metric: &str, value: i64) {
        self.enqueue(format_record(&self.project, metric, value, "g"))
            .await;
    }

    // Waits for queue capacity when the buffer is full; the only producer
    // blocking point. Errors only once the emitter is closed.
    async fn enqueue(&self, record: String) {
        let _ = self.tx.send(record).await;
    }
}

/// Drain records sequentially, one fresh socket and one datagram per record.
async fn sender_loop(address: String, mut rx: mpsc::Receiver<String>) {
    while let Some(record) = rx.recv().await {
        if let Ok(socket) = UdpSocket::bind("0.0.0.0:0").await {
            let _ = socket.send_to(record.as_bytes(), &address).await;
        }
    }
}

fn format_record(project: &str, metric: &str, value: i64, unit: &str) -> String {
    format!("{project}.{metric}:{value}|{unit}")
}
