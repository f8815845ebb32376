//! Fan-out of state updates to front ends.

use lab_core::StateUpdate;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

/// Default number of updates buffered per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Broadcast channel of [`StateUpdate`]s.
///
/// Publishing never fails: with no subscribers the update is dropped.
#[derive(Debug, Clone)]
pub struct UiBus {
    tx: broadcast::Sender<StateUpdate>,
}

impl Default for UiBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl UiBus {
    /// Create a bus buffering `capacity` updates per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an update to every subscriber.
    pub fn publish(&self, update: StateUpdate) {
        trace!(?update, "Publishing state update");
        let _ = self.tx.send(update);
    }

    /// Subscribe to future updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.tx.subscribe()
    }

    /// Subscribe as a stream; lagged subscribers see `Err` items.
    #[must_use]
    pub fn stream(&self) -> BroadcastStream<StateUpdate> {
        BroadcastStream::new(self.tx.subscribe())
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
