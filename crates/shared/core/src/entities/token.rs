use serde::{Deserialize, Serialize};

use super::history::{PriceHistory, PriceSample};
use super::tier::{VolatilityTier, deserialize_lenient};
use crate::values::{Timestamp, TokenId};

/// A tradable in-game instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub price_history: PriceHistory,
    /// `None` when the stored tier is missing or unrecognised
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub volatility_tier: Option<VolatilityTier>,
    pub trend_momentum: f64,
    pub is_active: bool,
    pub is_delisted: bool,
    /// Optimistic concurrency counter, owned by the store
    #[serde(default)]
    pub version: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Token {
    /// Create an active token with a single genesis price sample
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        tier: VolatilityTier,
        price: f64,
        volume_24h: f64,
        market_cap: f64,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TokenId::new(),
            symbol: symbol.into(),
            name: name.into(),
            current_price: price,
            volume_24h,
            market_cap,
            price_history: PriceHistory::genesis(PriceSample::new(now, price)),
            volatility_tier: Some(tier),
            trend_momentum: 0.0,
            is_active: true,
            is_delisted: false,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the token takes part in ticks
    pub fn is_tradable(&self) -> bool {
        self.is_active && !self.is_delisted
    }

    /// Retire the token: price forced to zero and a terminal zero sample recorded
    pub fn delist(&mut self, at: Timestamp, history_capacity: usize) {
        self.current_price = 0.0;
        self.is_active = false;
        self.is_delisted = true;
        self.price_history
            .record(PriceSample::new(at, 0.0), history_capacity);
        self.updated_at = at;
    }
}
