//! Shutdown coordination for the proxy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the serve loop subscribes to. The
/// signal watcher triggers it; tests can trigger it directly.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks requests currently being handled, for graceful drain.
///
/// The count is incremented when a request enters dispatch and decremented
/// when its guard drops, including on panic unwind.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    count: Arc<AtomicU64>,
}

impl InFlightTracker {
    /// Create a new tracker with zero in-flight requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request entering dispatch. Returns a guard that decrements
    /// the count on drop.
    pub fn track(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Current number of in-flight requests.
    pub fn active(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Wait until no requests are in flight.
    pub async fn wait_idle(&self) {
        while self.count.load(Ordering::SeqCst) > 0 {
            // Check periodically
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

/// Guard representing one in-flight request.
#[derive(Debug)]
pub struct InFlightGuard {
    count: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}
