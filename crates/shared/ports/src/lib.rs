//! Ticker Ports
//!
//! Port definitions (traits) for the synthetic token market.
//! These define the boundaries between the tick engine and its collaborators:
//! the token store, the player trade ledger, the activity feed and the clock.

mod clock;
mod error;
mod event_publisher;
mod token_repository;
mod trade_ledger;

pub use clock::Clock;
pub use error::{StoreError, StoreResult};
pub use event_publisher::EventPublisher;
pub use token_repository::TokenRepository;
pub use trade_ledger::TradeLedger;
