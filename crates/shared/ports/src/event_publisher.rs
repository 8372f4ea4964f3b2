use async_trait::async_trait;
use ticker_core::MarketEvent;

/// Publisher for market events
///
/// Events are published to subscribers (activity feed, audit log, etc.)
/// This decouples the tick engine from the delivery mechanism.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all subscribers
    async fn publish(&self, event: MarketEvent);

    /// Get the number of active subscribers
    fn subscriber_count(&self) -> usize;
}
