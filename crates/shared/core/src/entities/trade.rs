use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::side::Side;
use crate::values::{Timestamp, TokenId};

/// A player trade as recorded by the order-entry subsystem
///
/// Read-only to the market engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub token_id: TokenId,
    pub side: Side,
    pub quantity: Decimal,
    /// Notional value of the trade
    pub total_amount: Decimal,
    pub timestamp: Timestamp,
}

impl TradeRecord {
    pub fn new(
        token_id: TokenId,
        side: Side,
        quantity: Decimal,
        total_amount: Decimal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            token_id,
            side,
            quantity,
            total_amount,
            timestamp,
        }
    }

    /// Signed contribution to net pressure: buys positive, sells negative
    pub fn signed_amount(&self) -> Decimal {
        match self.side {
            Side::Buy => self.total_amount,
            Side::Sell => -self.total_amount,
        }
    }
}
