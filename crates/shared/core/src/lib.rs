//! Ticker Core Domain
//!
//! Pure domain types for the synthetic token market.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod events;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    PriceHistory, PriceSample, Side, Token, TradeRecord, VolatilityTier, UnknownTierError,
};
pub use events::{MarketEvent, TokenDelistedEvent, TokenSpawnedEvent};
pub use values::{Timestamp, TokenId};
