use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::domain::events::HousekeepingEvent;
use crate::domain::ports::EventPublisher;

/// Adapter: implements the domain port on top of `tokio::sync::broadcast`.
/// Lagging subscribers lose the oldest events.
#[derive(Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<HousekeepingEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events published from now on; lag errors are filtered out.
    pub fn subscribe_stream(&self) -> impl Stream<Item = HousekeepingEvent> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|res| async move { res.ok() })
    }
}

impl EventPublisher<HousekeepingEvent> for BroadcastPublisher {
    fn publish(&self, event: &HousekeepingEvent) {
        // No subscribers is not an error.
        let _ = self.tx.send(event.clone());
    }
}
