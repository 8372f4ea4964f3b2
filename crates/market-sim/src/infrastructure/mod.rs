pub mod event_publisher;
pub mod repositories;

pub use event_publisher::BroadcastEventPublisher;
pub use repositories::{InMemoryTokenRepository, InMemoryTradeLedger};
