use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticker_core::MarketEvent;
use ticker_ports::EventPublisher;
use tokio::sync::broadcast;

/// Broadcast-based event publisher
///
/// Uses a tokio broadcast channel to fan market events out to the activity
/// feed and any other listeners. Publishing never blocks; with no
/// subscribers events are dropped.
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<MarketEvent>,
    /// Events handed to the channel since creation
    published: Arc<AtomicUsize>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);

        BroadcastEventPublisher {
            tx,
            published: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to all events; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.tx.subscribe()
    }

    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Clone for BroadcastEventPublisher {
    fn clone(&self) -> Self {
        BroadcastEventPublisher {
            tx: self.tx.clone(),
            published: Arc::clone(&self.published),
        }
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: MarketEvent) {
        self.published.fetch_add(1, Ordering::SeqCst);
        // Ignore send errors (no subscribers)
        let _ = self.tx.send(event);
    }

    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
