use serde::{Deserialize, Serialize};

use crate::values::{Timestamp, TokenId};

/// Domain events emitted by the market engine
///
/// Delisting and spawning are recorded as separate events so the intent of a
/// tick can be audited or replayed without inspecting store side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "camelCase")]
pub enum MarketEvent {
    /// A token was rug-pulled and retired
    TokenDelisted(TokenDelistedEvent),
    /// A new token entered the market
    TokenSpawned(TokenSpawnedEvent),
}

impl MarketEvent {
    pub fn token_id(&self) -> TokenId {
        match self {
            MarketEvent::TokenDelisted(e) => e.token_id,
            MarketEvent::TokenSpawned(e) => e.token_id,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            MarketEvent::TokenDelisted(e) => &e.symbol,
            MarketEvent::TokenSpawned(e) => &e.symbol,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            MarketEvent::TokenDelisted(e) => e.timestamp,
            MarketEvent::TokenSpawned(e) => e.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDelistedEvent {
    pub token_id: TokenId,
    pub symbol: String,
    pub final_price: f64,
    /// Set when the replacement token was persisted
    pub replacement_id: Option<TokenId>,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSpawnedEvent {
    pub token_id: TokenId,
    pub symbol: String,
    pub name: String,
    pub initial_price: f64,
    /// The delisted token this one replaces
    pub replaces: Option<TokenId>,
    pub timestamp: Timestamp,
}
