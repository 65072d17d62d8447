//! Fan-out of risk snapshots to live subscribers.
//!
//! Backed by a `tokio::sync::broadcast` channel. Subscribers that fall
//! more than [`CAPACITY`] snapshots behind receive
//! [`broadcast::error::RecvError::Lagged`] and skip to the newest one.
//! The most recent snapshot is also kept for clients that poll.

use std::sync::{Arc, PoisonError, RwLock};

use fire_watch_simulation_models::RiskSnapshot;
use tokio::sync::broadcast;

/// Snapshots buffered per subscriber.
pub const CAPACITY: usize = 16;

/// Publishes snapshots to every current subscriber.
#[derive(Debug, Clone)]
pub struct RiskBroadcaster {
    tx: broadcast::Sender<Arc<RiskSnapshot>>,
    latest: Arc<RwLock<Arc<RiskSnapshot>>>,
}

impl RiskBroadcaster {
    /// Creates a broadcaster whose "latest" snapshot starts as `initial`.
    #[must_use]
    pub fn new(initial: RiskSnapshot) -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self {
            tx,
            latest: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Registers a new subscriber. It receives every snapshot published
    /// from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RiskSnapshot>> {
        self.tx.subscribe()
    }

    /// Publishes `snapshot` and records it as the latest.
    ///
    /// Returns the number of subscribers it was delivered to. Zero
    /// subscribers is not an error.
    pub fn publish(&self, snapshot: Arc<RiskSnapshot>) -> usize {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        self.tx.send(snapshot).unwrap_or(0)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Arc<RiskSnapshot> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
